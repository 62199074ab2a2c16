use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::Database;
use crate::error::Error;
use crate::order::{self, OrderId};
use crate::pipeline::{self, Resource};
use crate::secret::TransformRegistry;
use crate::validation::{FieldSpec, Rule, Schema};
use crate::vendor::{self, VendorId};
use crate::vendor_campaign::{self, VendorCampaignId};

use super::{Payment, PaymentId, PaymentStatus};

static CREATE_PAYMENT: Schema = Schema::new(&[
    FieldSpec::required("orderId", "order_id", Rule::Uuid),
    FieldSpec::required("vendorId", "vendor_id", Rule::Uuid),
    FieldSpec::required("vendorCampaignId", "vendor_campaign_id", Rule::Uuid),
    FieldSpec::required("transactionId", "transaction_id", Rule::max(500)),
    FieldSpec::optional("gateway", "gateway", Rule::max(20)).or(default_gateway),
    FieldSpec::required("amount", "amount", Rule::Amount),
    FieldSpec::optional("currency", "currency", Rule::max(10)).or(default_currency),
    FieldSpec::required("status", "status", Rule::OneOf(PaymentStatus::NAMES)),
]);

static PATCH_PAYMENT: Schema = Schema::new(&[
    FieldSpec::optional("transactionId", "transaction_id", Rule::max(500)),
    FieldSpec::optional("gateway", "gateway", Rule::max(20)),
    FieldSpec::optional("amount", "amount", Rule::Amount),
    FieldSpec::optional("currency", "currency", Rule::max(10)),
    FieldSpec::optional("status", "status", Rule::OneOf(PaymentStatus::NAMES)),
]);

fn default_gateway() -> Value {
    json!("PayU")
}

fn default_currency() -> Value {
    json!("INR")
}

#[derive(Deserialize)]
struct NewPayment {
    order_id: OrderId,
    vendor_id: VendorId,
    vendor_campaign_id: VendorCampaignId,
    transaction_id: String,
    gateway: String,
    amount: f64,
    currency: String,
    status: PaymentStatus,
}

#[tracing::instrument(skip(db, input))]
pub async fn create_payment(db: &dyn Database, input: &Value) -> Result<Payment, Error> {
    let new: NewPayment =
        pipeline::prepare_create(&CREATE_PAYMENT, &TransformRegistry::empty(), input).await?;

    // the store has no foreign keys
    order::manager::expect_order_by_id(db, new.order_id).await?;
    vendor::manager::expect_vendor_by_id(db, new.vendor_id).await?;
    vendor_campaign::manager::expect_vendor_campaign_by_id(db, new.vendor_campaign_id).await?;

    let now = Utc::now();
    let payment = Payment {
        id: PaymentId::new(),
        order_id: new.order_id,
        vendor_id: new.vendor_id,
        vendor_campaign_id: new.vendor_campaign_id,
        transaction_id: new.transaction_id,
        gateway: new.gateway,
        amount: new.amount,
        currency: new.currency,
        status: new.status,
        created_at: now,
        updated_at: now,
    };

    db.payments()
        .insert_payment(&payment)
        .await
        .map_err(|err| Resource::Payment.translate(err))?;

    Ok(payment)
}

#[tracing::instrument(skip(db))]
pub async fn get_payments(db: &dyn Database) -> Result<Vec<Payment>, Error> {
    let payments = db.payments().fetch_payments().await?;

    Ok(payments)
}

#[tracing::instrument(skip(db))]
pub async fn expect_payment_by_id(
    db: &dyn Database,
    payment_id: PaymentId,
) -> Result<Payment, Error> {
    let payment = db
        .payments()
        .fetch_payment_by_id(payment_id)
        .await?
        .ok_or(Error::ResourceNotFound {
            resource: Resource::Payment,
        })?;

    Ok(payment)
}

#[tracing::instrument(skip(db, input))]
pub async fn update_payment(
    db: &dyn Database,
    payment_id: PaymentId,
    input: &Value,
) -> Result<Payment, Error> {
    pipeline::apply_partial_update(
        Resource::Payment,
        &PATCH_PAYMENT,
        &TransformRegistry::empty(),
        input,
        |fields| db.payments().update_payment(payment_id, fields),
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::database::test::MockDatabase;
    use crate::database::StoreError;

    fn payment_input(transaction_id: &str) -> Value {
        json!({
            "orderId": OrderId::new().to_string(),
            "vendorId": VendorId::new().to_string(),
            "vendorCampaignId": VendorCampaignId::new().to_string(),
            "transactionId": transaction_id,
            "amount": 499.5,
            "status": "Pending",
        })
    }

    #[tokio::test]
    async fn gateway_and_currency_have_defaults() {
        let mut db = MockDatabase::new().with_known_references();
        db.payments.on_insert_payment = Box::new(|payment| {
            assert_eq!(payment.gateway, "PayU");
            assert_eq!(payment.currency, "INR");
            assert_eq!(payment.amount, 499.5);
            assert_eq!(payment.status, PaymentStatus::Pending);
            Ok(())
        });

        let payment = create_payment(&db, &payment_input("txn-1")).await.unwrap();

        assert_eq!(payment.transaction_id, "txn-1");
    }

    #[tokio::test]
    async fn duplicate_transaction_id_is_rejected() {
        let mut db = MockDatabase::new().with_known_references();
        let taken = Arc::new(Mutex::new(Vec::<String>::new()));
        let taken_clone = Arc::clone(&taken);
        db.payments.on_insert_payment = Box::new(move |payment| {
            let mut taken = taken_clone.lock().unwrap();
            if taken.contains(&payment.transaction_id) {
                return Err(StoreError::UniqueViolation);
            }
            taken.push(payment.transaction_id);
            Ok(())
        });

        create_payment(&db, &payment_input("txn-7")).await.unwrap();
        let result = create_payment(&db, &payment_input("txn-7")).await;

        assert_eq!(result.unwrap_err(), Error::DuplicateTransactionId);
        assert_eq!(taken.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_requires_an_existing_order() {
        let mut db = MockDatabase::new().with_known_references();
        db.orders.on_fetch_order_by_id = Box::new(|_| Ok(None));

        let result = create_payment(&db, &payment_input("txn-3")).await;

        assert_eq!(
            result.unwrap_err(),
            Error::ResourceNotFound {
                resource: Resource::Order
            }
        );
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let db = MockDatabase::new();

        let result = update_payment(&db, PaymentId::new(), &json!({ "amount": 0 })).await;

        assert!(matches!(result, Err(Error::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn update_maps_duplicate_transaction_id() {
        let mut db = MockDatabase::new();
        db.payments.on_update_payment = Box::new(|_, _| Err(StoreError::UniqueViolation));

        let result = update_payment(
            &db,
            PaymentId::new(),
            &json!({ "transactionId": "txn-7" }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::DuplicateTransactionId);
    }
}
