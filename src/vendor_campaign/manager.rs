use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::database::Database;
use crate::error::Error;
use crate::pipeline::{self, Resource};
use crate::secret::TransformRegistry;
use crate::validation::{FieldSpec, Rule, Schema};
use crate::vendor::{self, VendorId};

use super::{VendorCampaign, VendorCampaignId, VendorCampaignStatus};

static CREATE_VENDOR_CAMPAIGN: Schema = Schema::new(&[
    FieldSpec::required("vendorId", "vendor_id", Rule::Uuid),
    FieldSpec::required("templateCampaignId", "template_campaign_id", Rule::max(150)),
    FieldSpec::optional(
        "templateCampaignDetails",
        "template_campaign_details",
        Rule::Any,
    ),
    FieldSpec::optional("name", "name", Rule::max(150)),
]);

static PATCH_VENDOR_CAMPAIGN: Schema = Schema::new(&[
    FieldSpec::optional("name", "name", Rule::max(150)),
    FieldSpec::optional(
        "templateCampaignDetails",
        "template_campaign_details",
        Rule::Any,
    ),
    FieldSpec::optional(
        "status",
        "status",
        Rule::OneOf(VendorCampaignStatus::NAMES),
    ),
]);

#[derive(Deserialize)]
struct NewVendorCampaign {
    vendor_id: VendorId,
    template_campaign_id: String,
    template_campaign_details: Option<Value>,
    name: Option<String>,
}

/// New campaigns always start out as drafts.
#[tracing::instrument(skip(db, input))]
pub async fn create_vendor_campaign(
    db: &dyn Database,
    input: &Value,
) -> Result<VendorCampaign, Error> {
    let new: NewVendorCampaign = pipeline::prepare_create(
        &CREATE_VENDOR_CAMPAIGN,
        &TransformRegistry::empty(),
        input,
    )
    .await?;

    // the store has no foreign keys
    vendor::manager::expect_vendor_by_id(db, new.vendor_id).await?;

    let now = Utc::now();
    let campaign = VendorCampaign {
        id: VendorCampaignId::new(),
        vendor_id: new.vendor_id,
        name: new.name,
        template_campaign_id: new.template_campaign_id,
        template_campaign_details: new.template_campaign_details,
        status: VendorCampaignStatus::Draft,
        created_at: now,
        updated_at: now,
    };

    db.vendor_campaigns()
        .insert_vendor_campaign(&campaign)
        .await
        .map_err(|err| Resource::VendorCampaign.translate(err))?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_vendor_campaigns(db: &dyn Database) -> Result<Vec<VendorCampaign>, Error> {
    let campaigns = db.vendor_campaigns().fetch_vendor_campaigns().await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn expect_vendor_campaign_by_id(
    db: &dyn Database,
    campaign_id: VendorCampaignId,
) -> Result<VendorCampaign, Error> {
    let campaign = db
        .vendor_campaigns()
        .fetch_vendor_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::ResourceNotFound {
            resource: Resource::VendorCampaign,
        })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db, input))]
pub async fn update_vendor_campaign(
    db: &dyn Database,
    campaign_id: VendorCampaignId,
    input: &Value,
) -> Result<VendorCampaign, Error> {
    pipeline::apply_partial_update(
        Resource::VendorCampaign,
        &PATCH_VENDOR_CAMPAIGN,
        &TransformRegistry::empty(),
        input,
        |fields| db.vendor_campaigns().update_vendor_campaign(campaign_id, fields),
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::database::stamped_update;
    use crate::database::test::{sample_vendor_campaign, MockDatabase};
    use crate::validation::IssueCode;

    #[tokio::test]
    async fn can_create_vendor_campaign_as_draft() {
        let mut db = MockDatabase::new().with_known_references();
        let test_vendor_id = VendorId::new();
        let called_insert = Arc::new(Mutex::new(false));
        let called_insert_clone = Arc::clone(&called_insert);
        db.vendor_campaigns.on_insert_vendor_campaign = Box::new(move |campaign| {
            *called_insert_clone.lock().unwrap() = true;
            assert_eq!(campaign.vendor_id, test_vendor_id);
            assert_eq!(campaign.status, VendorCampaignStatus::Draft);
            assert_eq!(
                campaign.template_campaign_details,
                Some(json!({ "steps": [{ "kind": "sms" }] }))
            );
            Ok(())
        });

        let campaign = create_vendor_campaign(
            &db,
            &json!({
                "vendorId": test_vendor_id.to_string(),
                "templateCampaignId": "tmpl-42",
                "templateCampaignDetails": { "steps": [{ "kind": "sms" }] },
            }),
        )
        .await
        .unwrap();

        assert_eq!(campaign.name, None);
        assert!(
            *called_insert.lock().unwrap(),
            "db.insert_vendor_campaign was not called"
        );
    }

    #[tokio::test]
    async fn create_requires_an_existing_vendor() {
        let mut db = MockDatabase::new();
        db.vendors.on_fetch_vendor_by_id = Box::new(|_| Ok(None));

        let result = create_vendor_campaign(
            &db,
            &json!({
                "vendorId": VendorId::new().to_string(),
                "templateCampaignId": "tmpl-42",
            }),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::ResourceNotFound {
                resource: Resource::Vendor
            }
        );
    }

    #[tokio::test]
    async fn create_rejects_malformed_vendor_id() {
        let db = MockDatabase::new();

        let result = create_vendor_campaign(
            &db,
            &json!({ "vendorId": "vendor-1", "templateCampaignId": "tmpl-42" }),
        )
        .await;

        match result.unwrap_err() {
            Error::ValidationFailed { issues } => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].code, IssueCode::InvalidString);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_accepts_any_listed_status() {
        let mut db = MockDatabase::new();
        db.vendor_campaigns.on_update_vendor_campaign = Box::new(|campaign_id, fields| {
            assert_eq!(fields["status"], "Pending_Payment");
            let mut campaign = sample_vendor_campaign(campaign_id, VendorId::new());
            campaign.status = VendorCampaignStatus::PendingPayment;
            Ok(campaign)
        });

        let campaign = update_vendor_campaign(
            &db,
            VendorCampaignId::new(),
            &json!({ "status": "Pending_Payment" }),
        )
        .await
        .unwrap();

        assert_eq!(campaign.status, VendorCampaignStatus::PendingPayment);
    }

    #[tokio::test]
    async fn update_keeps_huge_integers_in_template_details_storable() {
        let mut db = MockDatabase::new();
        db.vendor_campaigns.on_update_vendor_campaign = Box::new(|campaign_id, fields| {
            stamped_update(&fields).unwrap();
            let mut campaign = sample_vendor_campaign(campaign_id, VendorId::new());
            campaign.template_campaign_details = fields.get("template_campaign_details").cloned();
            Ok(campaign)
        });

        let campaign = update_vendor_campaign(
            &db,
            VendorCampaignId::new(),
            &json!({ "templateCampaignDetails": { "budget": { "cap": u64::MAX } } }),
        )
        .await
        .unwrap();

        let details = campaign.template_campaign_details.unwrap();
        assert_eq!(details["budget"]["cap"].as_f64(), Some(u64::MAX as f64));
    }

    #[tokio::test]
    async fn update_rejects_unknown_status() {
        let db = MockDatabase::new();

        let result = update_vendor_campaign(
            &db,
            VendorCampaignId::new(),
            &json!({ "status": "Archived" }),
        )
        .await;

        match result.unwrap_err() {
            Error::ValidationFailed { issues } => {
                assert_eq!(issues[0].code, IssueCode::InvalidEnumValue)
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
