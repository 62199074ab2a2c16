use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;

use crate::database::{set_fields, updated_document, MongoVendorCampaignPropertyStore, StoreError};
use crate::validation::Fields;
use crate::vendor_campaign::VendorCampaignId;

use super::{VendorCampaignProperty, VendorCampaignPropertyId};

pub const VENDOR_CAMPAIGN_PROPERTIES: &str = "vendor_campaign_properties";

pub async fn initialize(db: &mongodb::Database) -> Result<(), StoreError> {
    db.run_command(
        bson::doc! {
            "createIndexes": VENDOR_CAMPAIGN_PROPERTIES,
            "indexes": [
                { "key": { "vendor_campaign_id": 1 }, "name": "by_vendor_campaign_id" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait VendorCampaignPropertyStore: Send + Sync {
    async fn fetch_properties_by_campaign(
        &self,
        campaign_id: VendorCampaignId,
    ) -> Result<Vec<VendorCampaignProperty>, StoreError>;

    /// Returns how many properties were removed.
    async fn delete_properties_by_campaign(
        &self,
        campaign_id: VendorCampaignId,
    ) -> Result<u64, StoreError>;

    /// Returns how many properties were stored.
    async fn insert_properties(
        &self,
        properties: &[VendorCampaignProperty],
    ) -> Result<u64, StoreError>;

    async fn update_property(
        &self,
        property_id: VendorCampaignPropertyId,
        fields: Fields,
    ) -> Result<VendorCampaignProperty, StoreError>;
}

#[async_trait]
impl VendorCampaignPropertyStore for MongoVendorCampaignPropertyStore {
    #[tracing::instrument(skip(self))]
    async fn fetch_properties_by_campaign(
        &self,
        campaign_id: VendorCampaignId,
    ) -> Result<Vec<VendorCampaignProperty>, StoreError> {
        let properties: Vec<VendorCampaignProperty> = self
            .find(bson::doc! { "vendor_campaign_id": campaign_id }, None)
            .await?
            .try_collect()
            .await?;

        Ok(properties)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_properties_by_campaign(
        &self,
        campaign_id: VendorCampaignId,
    ) -> Result<u64, StoreError> {
        let result = self
            .delete_many(bson::doc! { "vendor_campaign_id": campaign_id }, None)
            .await?;

        Ok(result.deleted_count)
    }

    #[tracing::instrument(skip(self, properties), fields(count = properties.len()))]
    async fn insert_properties(
        &self,
        properties: &[VendorCampaignProperty],
    ) -> Result<u64, StoreError> {
        let result = self.insert_many(properties, None).await?;

        Ok(result.inserted_ids.len() as u64)
    }

    #[tracing::instrument(skip(self, fields))]
    async fn update_property(
        &self,
        property_id: VendorCampaignPropertyId,
        fields: Fields,
    ) -> Result<VendorCampaignProperty, StoreError> {
        let property = self
            .find_one_and_update(
                bson::doc! { "_id": property_id },
                set_fields(&fields)?,
                updated_document(),
            )
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(property)
    }
}
