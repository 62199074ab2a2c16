use actix_web::web::{Data, Json, Path};
use actix_web::{get, patch, post};
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use serde_json::Value;

use crate::database::Database;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::vendor::endpoints::VendorSummaryBody;
use crate::vendor::VendorId;

use super::{manager, VendorCampaign, VendorCampaignId, VendorCampaignStatus};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCampaignBody {
    pub id: VendorCampaignId,
    pub vendor_id: VendorId,
    pub name: Option<String>,
    pub template_campaign_id: String,
    pub template_campaign_details: Option<Value>,
    pub status: VendorCampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorSummaryBody>,
}

impl VendorCampaignBody {
    pub async fn render(
        db: &dyn Database,
        campaign: VendorCampaign,
    ) -> Result<VendorCampaignBody, Error> {
        let vendor = db
            .vendors()
            .fetch_vendor_by_id(campaign.vendor_id)
            .await?
            .map(VendorSummaryBody::render);

        Ok(VendorCampaignBody {
            vendor,
            ..VendorCampaignBody::render_flat(campaign)
        })
    }

    /// Renders the campaign without looking up its vendor.
    pub fn render_flat(campaign: VendorCampaign) -> VendorCampaignBody {
        VendorCampaignBody {
            id: campaign.id,
            vendor_id: campaign.vendor_id,
            name: campaign.name,
            template_campaign_id: campaign.template_campaign_id,
            template_campaign_details: campaign.template_campaign_details,
            status: campaign.status,
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
            vendor: None,
        }
    }
}

#[get("/vendor-campaigns")]
#[tracing::instrument(skip(db))]
async fn get_vendor_campaigns(
    db: Data<Box<dyn Database>>,
) -> Result<Envelope<Vec<VendorCampaignBody>>, Error> {
    let campaigns = manager::get_vendor_campaigns(&***db).await?;

    let body = stream::iter(campaigns)
        .then(|campaign| VendorCampaignBody::render(&***db, campaign))
        .try_collect()
        .await?;

    Ok(Envelope::ok("campaigns", body))
}

#[post("/vendor-campaigns")]
#[tracing::instrument(skip(db, body))]
async fn create_vendor_campaign(
    db: Data<Box<dyn Database>>,
    body: Json<Value>,
) -> Result<Envelope<VendorCampaignId>, Error> {
    let campaign = manager::create_vendor_campaign(&***db, &body).await?;

    Ok(Envelope::created("campaignId", campaign.id))
}

#[get("/vendor-campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn get_vendor_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<VendorCampaignId>,
) -> Result<Envelope<VendorCampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::expect_vendor_campaign_by_id(&***db, campaign_id).await?;

    let body = VendorCampaignBody::render(&***db, campaign).await?;

    Ok(Envelope::ok("vendorCampaign", body))
}

#[patch("/vendor-campaigns/{campaign_id}")]
#[tracing::instrument(skip(db, body))]
async fn update_vendor_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<VendorCampaignId>,
    body: Json<Value>,
) -> Result<Envelope<VendorCampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::update_vendor_campaign(&***db, campaign_id, &body).await?;

    let body = VendorCampaignBody::render(&***db, campaign).await?;

    Ok(Envelope::ok("updatedVendorCampaign", body))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::json;

    use crate::database::test::{sample_vendor, sample_vendor_campaign, MockDatabase};
    use crate::database::StoreError;

    use super::*;

    fn summary_keys(vendor: &Value) -> Vec<String> {
        let mut keys: Vec<String> = vendor.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[actix_web::test]
    async fn nested_vendor_is_only_a_summary() {
        let mut db = MockDatabase::new();
        let test_vendor_id = VendorId::new();
        db.vendors.on_fetch_vendor_by_id = Box::new(|vendor_id| Ok(Some(sample_vendor(vendor_id))));
        db.vendor_campaigns.on_fetch_vendor_campaign_by_id = Box::new(move |campaign_id| {
            Ok(Some(sample_vendor_campaign(campaign_id, test_vendor_id)))
        });
        db.vendor_campaigns.on_update_vendor_campaign = Box::new(move |campaign_id, _| {
            Ok(sample_vendor_campaign(campaign_id, test_vendor_id))
        });
        let app = test_app!(db);

        let get = TestRequest::get()
            .uri(&format!("/api/backend/vendor-campaigns/{}", VendorCampaignId::new()))
            .to_request();
        let response = test::call_service(&app, get).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            summary_keys(&body["vendorCampaign"]["vendor"]),
            vec!["id", "name", "vendorName"]
        );
        assert_eq!(body["vendorCampaign"]["status"], "Draft");

        let patch = TestRequest::patch()
            .uri(&format!("/api/backend/vendor-campaigns/{}", VendorCampaignId::new()))
            .set_json(json!({ "name": "Renamed" }))
            .to_request();
        let response = test::call_service(&app, patch).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            summary_keys(&body["updatedVendorCampaign"]["vendor"]),
            vec!["id", "name", "vendorName"]
        );
        assert_eq!(
            body["updatedVendorCampaign"]["vendor"]["id"],
            test_vendor_id.to_string()
        );
    }

    #[actix_web::test]
    async fn create_responds_with_campaign_id() {
        let mut db = MockDatabase::new().with_known_references();
        db.vendor_campaigns.on_insert_vendor_campaign = Box::new(|_| Ok(()));
        let app = test_app!(db);

        let request = TestRequest::post()
            .uri("/api/backend/vendor-campaigns")
            .set_json(json!({
                "vendorId": VendorId::new().to_string(),
                "templateCampaignId": "tmpl-42",
            }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(response).await;
        assert!(body["campaignId"].is_string());
    }

    #[actix_web::test]
    async fn invalid_status_lists_issues() {
        let db = MockDatabase::new();
        let app = test_app!(db);

        let request = TestRequest::patch()
            .uri(&format!("/api/backend/vendor-campaigns/{}", VendorCampaignId::new()))
            .set_json(json!({ "status": "Paused" }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["errors"][0]["path"], json!(["status"]));
        assert_eq!(body["errors"][0]["code"], "invalid_enum_value");
    }

    #[actix_web::test]
    async fn patch_on_missing_campaign_is_not_found() {
        let mut db = MockDatabase::new();
        db.vendor_campaigns.on_update_vendor_campaign = Box::new(|_, _| Err(StoreError::NotFound));
        let app = test_app!(db);

        let request = TestRequest::patch()
            .uri(&format!("/api/backend/vendor-campaigns/{}", VendorCampaignId::new()))
            .set_json(json!({ "status": "Active" }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "Vendor Campaign not found");
    }
}
