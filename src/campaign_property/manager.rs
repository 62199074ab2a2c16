use serde::Deserialize;
use serde_json::Value;

use crate::database::Database;
use crate::error::Error;
use crate::pipeline::{self, Resource};
use crate::secret::TransformRegistry;
use crate::validation::{FieldSpec, Rule, Schema};
use crate::vendor_campaign::{self, VendorCampaignId};

use super::{VendorCampaignProperty, VendorCampaignPropertyId};

static PROPERTY: Schema = Schema::new(&[
    FieldSpec::required("propertyKey", "property_key", Rule::max(150)),
    FieldSpec::required("propertyValue", "property_value", Rule::max(150)),
]);

static REPLACE_PROPERTIES: Schema = Schema::new(&[
    FieldSpec::required("vendorCampaignId", "vendor_campaign_id", Rule::Uuid),
    FieldSpec::required("properties", "properties", Rule::List(&PROPERTY)),
]);

static PATCH_PROPERTY: Schema = Schema::new(&[FieldSpec::optional(
    "propertyValue",
    "property_value",
    Rule::max(150),
)]);

#[derive(Deserialize)]
struct NewProperty {
    property_key: String,
    property_value: String,
}

#[derive(Deserialize)]
struct PropertySet {
    vendor_campaign_id: VendorCampaignId,
    properties: Vec<NewProperty>,
}

#[tracing::instrument(skip(db))]
pub async fn get_properties_by_campaign(
    db: &dyn Database,
    campaign_id: VendorCampaignId,
) -> Result<Vec<VendorCampaignProperty>, Error> {
    let properties = db
        .vendor_campaign_properties()
        .fetch_properties_by_campaign(campaign_id)
        .await?;

    Ok(properties)
}

/// Drops every property of the campaign and stores the given ones in their
/// place. Returns how many were stored.
///
/// The campaign must exist. The delete and the insert are separate store
/// calls, so a concurrent reader may briefly see the campaign without
/// properties.
#[tracing::instrument(skip(db, input))]
pub async fn replace_properties(db: &dyn Database, input: &Value) -> Result<u64, Error> {
    let set: PropertySet =
        pipeline::prepare_create(&REPLACE_PROPERTIES, &TransformRegistry::empty(), input).await?;

    vendor_campaign::manager::expect_vendor_campaign_by_id(db, set.vendor_campaign_id).await?;

    let properties: Vec<VendorCampaignProperty> = set
        .properties
        .into_iter()
        .map(|property| VendorCampaignProperty {
            id: VendorCampaignPropertyId::new(),
            vendor_campaign_id: set.vendor_campaign_id,
            property_key: property.property_key,
            property_value: property.property_value,
        })
        .collect();

    let store = db.vendor_campaign_properties();
    store
        .delete_properties_by_campaign(set.vendor_campaign_id)
        .await?;

    if properties.is_empty() {
        return Ok(0);
    }

    let count = store
        .insert_properties(&properties)
        .await
        .map_err(|err| Resource::VendorCampaignProperty.translate(err))?;

    Ok(count)
}

#[tracing::instrument(skip(db, input))]
pub async fn update_property(
    db: &dyn Database,
    property_id: VendorCampaignPropertyId,
    input: &Value,
) -> Result<VendorCampaignProperty, Error> {
    pipeline::apply_partial_update(
        Resource::VendorCampaignProperty,
        &PATCH_PROPERTY,
        &TransformRegistry::empty(),
        input,
        |fields| {
            db.vendor_campaign_properties()
                .update_property(property_id, fields)
        },
    )
    .await
}
