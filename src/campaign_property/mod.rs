use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};
use crate::vendor_campaign::VendorCampaignId;

pub mod db;
pub mod endpoints;
pub mod manager;

pub type VendorCampaignPropertyId = TypedId<VendorCampaignProperty>;

/// A key/value setting of a campaign. The whole set for a campaign is
/// replaced at once, individual values can be patched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VendorCampaignProperty {
    #[serde(rename = "_id")]
    pub id: VendorCampaignPropertyId,
    pub vendor_campaign_id: VendorCampaignId,
    pub property_key: String,
    pub property_value: String,
}

impl TypedIdMarker for VendorCampaignProperty {
    fn tag() -> &'static str {
        "PRP"
    }
}
