use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, patch, post};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::Database;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::vendor_campaign::VendorCampaignId;

use super::{manager, VendorCampaignProperty, VendorCampaignPropertyId};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertiesQuery {
    vendor_campaign_id: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCampaignPropertyBody {
    pub id: VendorCampaignPropertyId,
    pub vendor_campaign_id: VendorCampaignId,
    pub property_key: String,
    pub property_value: String,
}

impl VendorCampaignPropertyBody {
    pub fn render(property: VendorCampaignProperty) -> VendorCampaignPropertyBody {
        VendorCampaignPropertyBody {
            id: property.id,
            vendor_campaign_id: property.vendor_campaign_id,
            property_key: property.property_key,
            property_value: property.property_value,
        }
    }
}

#[get("/vendor-campaign-properties")]
#[tracing::instrument(skip(db))]
async fn get_properties(
    db: Data<Box<dyn Database>>,
    query: Query<PropertiesQuery>,
) -> Result<Envelope<Vec<VendorCampaignPropertyBody>>, Error> {
    // an empty value counts as missing
    let campaign_id = query
        .into_inner()
        .vendor_campaign_id
        .filter(|campaign_id| !campaign_id.is_empty())
        .ok_or(Error::MissingQueryParameter {
            name: "vendorCampaignId",
        })?
        .parse::<VendorCampaignId>()
        .map_err(|_| Error::InvalidQueryParameter {
            name: "vendorCampaignId",
        })?;

    let properties = manager::get_properties_by_campaign(&***db, campaign_id).await?;

    let body = properties
        .into_iter()
        .map(VendorCampaignPropertyBody::render)
        .collect();

    Ok(Envelope::ok("properties", body))
}

#[post("/vendor-campaign-properties")]
#[tracing::instrument(skip(db, body))]
async fn replace_properties(
    db: Data<Box<dyn Database>>,
    body: Json<Value>,
) -> Result<Envelope<u64>, Error> {
    let count = manager::replace_properties(&***db, &body).await?;

    Ok(Envelope::created("count", count))
}

#[patch("/vendor-campaign-properties/{property_id}")]
#[tracing::instrument(skip(db, body))]
async fn update_property(
    db: Data<Box<dyn Database>>,
    params: Path<VendorCampaignPropertyId>,
    body: Json<Value>,
) -> Result<Envelope<VendorCampaignPropertyBody>, Error> {
    let property_id = params.into_inner();

    let property = manager::update_property(&***db, property_id, &body).await?;

    Ok(Envelope::ok(
        "updated",
        VendorCampaignPropertyBody::render(property),
    ))
}
