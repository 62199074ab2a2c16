use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;

use crate::database::{stamped_update, updated_document, MongoPaymentStore, StoreError};
use crate::validation::Fields;

use super::{Payment, PaymentId};

pub const PAYMENTS: &str = "payments";

pub async fn initialize(db: &mongodb::Database) -> Result<(), StoreError> {
    db.run_command(
        bson::doc! {
            "createIndexes": PAYMENTS,
            "indexes": [
                { "key": { "transaction_id": 1 }, "name": "unique_transaction_id", "unique": true },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Fails with [`StoreError::UniqueViolation`] if the transaction id is
    /// already taken.
    async fn insert_payment(&self, payment: &Payment) -> Result<(), StoreError>;

    async fn fetch_payments(&self) -> Result<Vec<Payment>, StoreError>;

    async fn fetch_payment_by_id(
        &self,
        payment_id: PaymentId,
    ) -> Result<Option<Payment>, StoreError>;

    async fn update_payment(
        &self,
        payment_id: PaymentId,
        fields: Fields,
    ) -> Result<Payment, StoreError>;
}

#[async_trait]
impl PaymentStore for MongoPaymentStore {
    #[tracing::instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn insert_payment(&self, payment: &Payment) -> Result<(), StoreError> {
        self.insert_one(payment, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_payments(&self) -> Result<Vec<Payment>, StoreError> {
        let payments: Vec<Payment> = self.find(bson::doc! {}, None).await?.try_collect().await?;

        Ok(payments)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_payment_by_id(
        &self,
        payment_id: PaymentId,
    ) -> Result<Option<Payment>, StoreError> {
        let payment = self.find_one(bson::doc! { "_id": payment_id }, None).await?;

        Ok(payment)
    }

    #[tracing::instrument(skip(self, fields))]
    async fn update_payment(
        &self,
        payment_id: PaymentId,
        fields: Fields,
    ) -> Result<Payment, StoreError> {
        let payment = self
            .find_one_and_update(
                bson::doc! { "_id": payment_id },
                stamped_update(&fields)?,
                updated_document(),
            )
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(payment)
    }
}
