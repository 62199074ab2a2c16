use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::OrderId;
use crate::typedid::{TypedId, TypedIdMarker};
use crate::vendor::VendorId;
use crate::vendor_campaign::VendorCampaignId;

pub mod db;
pub mod endpoints;
pub mod manager;

pub type PaymentId = TypedId<Payment>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub const NAMES: &'static [&'static str] = &["Pending", "Success", "Failed"];
}

/// A gateway transaction for an order. `transaction_id` is unique across all
/// payments.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: PaymentId,
    pub order_id: OrderId,
    pub vendor_id: VendorId,
    pub vendor_campaign_id: VendorCampaignId,
    pub transaction_id: String,
    pub gateway: String,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl TypedIdMarker for Payment {
    fn tag() -> &'static str {
        "PAY"
    }
}
