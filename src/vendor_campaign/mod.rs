use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::typedid::{TypedId, TypedIdMarker};
use crate::vendor::VendorId;

pub mod db;
pub mod endpoints;
pub mod manager;

pub type VendorCampaignId = TypedId<VendorCampaign>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorCampaignStatus {
    Draft,
    #[serde(rename = "Pending_Payment")]
    PendingPayment,
    Active,
    Completed,
    Failed,
}

impl VendorCampaignStatus {
    /// Wire names, in declaration order.
    pub const NAMES: &'static [&'static str] =
        &["Draft", "Pending_Payment", "Active", "Completed", "Failed"];
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VendorCampaign {
    #[serde(rename = "_id")]
    pub id: VendorCampaignId,
    pub vendor_id: VendorId,
    pub name: Option<String>,
    pub template_campaign_id: String,
    pub template_campaign_details: Option<Value>,
    pub status: VendorCampaignStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl TypedIdMarker for VendorCampaign {
    fn tag() -> &'static str {
        "CMP"
    }
}
