use actix_web::web::{Data, Json, Path};
use actix_web::{get, patch, post};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::database::Database;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::vendor::VendorId;
use crate::vendor_campaign::VendorCampaignId;

use super::{manager, Order, OrderId};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    pub id: OrderId,
    pub vendor_id: VendorId,
    pub vendor_campaign_id: VendorCampaignId,
    pub order_count: i64,
    pub success_msg_count: i64,
    pub failed_msg_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderBody {
    pub fn render(order: Order) -> OrderBody {
        OrderBody {
            id: order.id,
            vendor_id: order.vendor_id,
            vendor_campaign_id: order.vendor_campaign_id,
            order_count: order.order_count,
            success_msg_count: order.success_msg_count,
            failed_msg_count: order.failed_msg_count,
            view_count: order.view_count,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[get("/orders")]
#[tracing::instrument(skip(db))]
async fn get_orders(db: Data<Box<dyn Database>>) -> Result<Envelope<Vec<OrderBody>>, Error> {
    let orders = manager::get_orders(&***db).await?;

    let body = orders.into_iter().map(OrderBody::render).collect();

    Ok(Envelope::ok("orders", body))
}

#[post("/orders")]
#[tracing::instrument(skip(db, body))]
async fn create_order(
    db: Data<Box<dyn Database>>,
    body: Json<Value>,
) -> Result<Envelope<OrderId>, Error> {
    let order = manager::create_order(&***db, &body).await?;

    Ok(Envelope::created("orderId", order.id))
}

#[get("/orders/{order_id}")]
#[tracing::instrument(skip(db))]
async fn get_order_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<OrderId>,
) -> Result<Envelope<OrderBody>, Error> {
    let order_id = params.into_inner();

    let order = manager::expect_order_by_id(&***db, order_id).await?;

    Ok(Envelope::ok("order", OrderBody::render(order)))
}

#[patch("/orders/{order_id}")]
#[tracing::instrument(skip(db, body))]
async fn update_order(
    db: Data<Box<dyn Database>>,
    params: Path<OrderId>,
    body: Json<Value>,
) -> Result<Envelope<OrderBody>, Error> {
    let order_id = params.into_inner();

    let order = manager::update_order(&***db, order_id, &body).await?;

    Ok(Envelope::ok("updatedOrder", OrderBody::render(order)))
}
