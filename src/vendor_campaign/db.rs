use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;

use crate::database::{stamped_update, updated_document, MongoVendorCampaignStore, StoreError};
use crate::validation::Fields;

use super::{VendorCampaign, VendorCampaignId};

pub const VENDOR_CAMPAIGNS: &str = "vendor_campaigns";

pub async fn initialize(_db: &mongodb::Database) -> Result<(), StoreError> {
    Ok(())
}

#[async_trait]
pub trait VendorCampaignStore: Send + Sync {
    async fn insert_vendor_campaign(&self, campaign: &VendorCampaign) -> Result<(), StoreError>;

    async fn fetch_vendor_campaigns(&self) -> Result<Vec<VendorCampaign>, StoreError>;

    async fn fetch_vendor_campaign_by_id(
        &self,
        campaign_id: VendorCampaignId,
    ) -> Result<Option<VendorCampaign>, StoreError>;

    async fn update_vendor_campaign(
        &self,
        campaign_id: VendorCampaignId,
        fields: Fields,
    ) -> Result<VendorCampaign, StoreError>;
}

#[async_trait]
impl VendorCampaignStore for MongoVendorCampaignStore {
    #[tracing::instrument(skip(self, campaign), fields(campaign_id = %campaign.id))]
    async fn insert_vendor_campaign(&self, campaign: &VendorCampaign) -> Result<(), StoreError> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_vendor_campaigns(&self) -> Result<Vec<VendorCampaign>, StoreError> {
        let campaigns: Vec<VendorCampaign> =
            self.find(bson::doc! {}, None).await?.try_collect().await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_vendor_campaign_by_id(
        &self,
        campaign_id: VendorCampaignId,
    ) -> Result<Option<VendorCampaign>, StoreError> {
        let campaign = self
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self, fields))]
    async fn update_vendor_campaign(
        &self,
        campaign_id: VendorCampaignId,
        fields: Fields,
    ) -> Result<VendorCampaign, StoreError> {
        let campaign = self
            .find_one_and_update(
                bson::doc! { "_id": campaign_id },
                stamped_update(&fields)?,
                updated_document(),
            )
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(campaign)
    }
}
