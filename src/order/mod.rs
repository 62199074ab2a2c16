use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};
use crate::vendor::VendorId;
use crate::vendor_campaign::VendorCampaignId;

pub mod db;
pub mod endpoints;
pub mod manager;

pub type OrderId = TypedId<Order>;

/// Delivery counters of a campaign run for a vendor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub vendor_id: VendorId,
    pub vendor_campaign_id: VendorCampaignId,
    pub order_count: i64,
    pub success_msg_count: i64,
    pub failed_msg_count: i64,
    pub view_count: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl TypedIdMarker for Order {
    fn tag() -> &'static str {
        "ORD"
    }
}
