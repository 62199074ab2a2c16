use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;

use crate::database::{stamped_update, updated_document, MongoOrderStore, StoreError};
use crate::validation::Fields;

use super::{Order, OrderId};

pub const ORDERS: &str = "orders";

pub async fn initialize(_db: &mongodb::Database) -> Result<(), StoreError> {
    Ok(())
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;

    async fn fetch_orders(&self) -> Result<Vec<Order>, StoreError>;

    async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError>;

    async fn update_order(&self, order_id: OrderId, fields: Fields) -> Result<Order, StoreError>;
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.insert_one(order, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_orders(&self) -> Result<Vec<Order>, StoreError> {
        let orders: Vec<Order> = self.find(bson::doc! {}, None).await?.try_collect().await?;

        Ok(orders)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_order_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        let order = self.find_one(bson::doc! { "_id": order_id }, None).await?;

        Ok(order)
    }

    #[tracing::instrument(skip(self, fields))]
    async fn update_order(&self, order_id: OrderId, fields: Fields) -> Result<Order, StoreError> {
        let order = self
            .find_one_and_update(
                bson::doc! { "_id": order_id },
                stamped_update(&fields)?,
                updated_document(),
            )
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(order)
    }
}
