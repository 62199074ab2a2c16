use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::Database;
use crate::error::Error;
use crate::pipeline::{self, Resource};
use crate::secret::TransformRegistry;
use crate::validation::{FieldSpec, Rule, Schema};
use crate::vendor::{self, VendorId};
use crate::vendor_campaign::{self, VendorCampaignId};

use super::{Order, OrderId};

static CREATE_ORDER: Schema = Schema::new(&[
    FieldSpec::required("vendorId", "vendor_id", Rule::Uuid),
    FieldSpec::required("vendorCampaignId", "vendor_campaign_id", Rule::Uuid),
    FieldSpec::optional("orderCount", "order_count", Rule::Count).or(zero),
    FieldSpec::optional("successMsgCount", "success_msg_count", Rule::Count).or(zero),
    FieldSpec::optional("failedMsgCount", "failed_msg_count", Rule::Count).or(zero),
    FieldSpec::optional("viewCount", "view_count", Rule::Count).or(zero),
]);

static PATCH_ORDER: Schema = Schema::new(&[
    FieldSpec::optional("orderCount", "order_count", Rule::Count),
    FieldSpec::optional("successMsgCount", "success_msg_count", Rule::Count),
    FieldSpec::optional("failedMsgCount", "failed_msg_count", Rule::Count),
    FieldSpec::optional("viewCount", "view_count", Rule::Count),
]);

fn zero() -> Value {
    json!(0)
}

#[derive(Deserialize)]
struct NewOrder {
    vendor_id: VendorId,
    vendor_campaign_id: VendorCampaignId,
    order_count: i64,
    success_msg_count: i64,
    failed_msg_count: i64,
    view_count: i64,
}

#[tracing::instrument(skip(db, input))]
pub async fn create_order(db: &dyn Database, input: &Value) -> Result<Order, Error> {
    let new: NewOrder =
        pipeline::prepare_create(&CREATE_ORDER, &TransformRegistry::empty(), input).await?;

    // the store has no foreign keys
    vendor::manager::expect_vendor_by_id(db, new.vendor_id).await?;
    vendor_campaign::manager::expect_vendor_campaign_by_id(db, new.vendor_campaign_id).await?;

    let now = Utc::now();
    let order = Order {
        id: OrderId::new(),
        vendor_id: new.vendor_id,
        vendor_campaign_id: new.vendor_campaign_id,
        order_count: new.order_count,
        success_msg_count: new.success_msg_count,
        failed_msg_count: new.failed_msg_count,
        view_count: new.view_count,
        created_at: now,
        updated_at: now,
    };

    db.orders()
        .insert_order(&order)
        .await
        .map_err(|err| Resource::Order.translate(err))?;

    Ok(order)
}

#[tracing::instrument(skip(db))]
pub async fn get_orders(db: &dyn Database) -> Result<Vec<Order>, Error> {
    let orders = db.orders().fetch_orders().await?;

    Ok(orders)
}

#[tracing::instrument(skip(db))]
pub async fn expect_order_by_id(db: &dyn Database, order_id: OrderId) -> Result<Order, Error> {
    let order = db
        .orders()
        .fetch_order_by_id(order_id)
        .await?
        .ok_or(Error::ResourceNotFound {
            resource: Resource::Order,
        })?;

    Ok(order)
}

#[tracing::instrument(skip(db, input))]
pub async fn update_order(
    db: &dyn Database,
    order_id: OrderId,
    input: &Value,
) -> Result<Order, Error> {
    pipeline::apply_partial_update(
        Resource::Order,
        &PATCH_ORDER,
        &TransformRegistry::empty(),
        input,
        |fields| db.orders().update_order(order_id, fields),
    )
    .await
}
