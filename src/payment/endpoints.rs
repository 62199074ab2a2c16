use actix_web::web::{Data, Json, Path};
use actix_web::{get, patch, post};
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use serde_json::Value;

use crate::database::Database;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::order::endpoints::OrderBody;
use crate::order::OrderId;
use crate::vendor::endpoints::VendorBody;
use crate::vendor::VendorId;
use crate::vendor_campaign::endpoints::VendorCampaignBody;
use crate::vendor_campaign::VendorCampaignId;

use super::{manager, Payment, PaymentId, PaymentStatus};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBody {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub vendor_id: VendorId,
    pub vendor_campaign_id: VendorCampaignId,
    pub transaction_id: String,
    pub gateway: String,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub order: Option<OrderBody>,
    pub vendor: Option<VendorBody>,
    pub vendor_campaign: Option<VendorCampaignBody>,
}

impl PaymentBody {
    pub async fn render(db: &dyn Database, payment: Payment) -> Result<PaymentBody, Error> {
        let order = db
            .orders()
            .fetch_order_by_id(payment.order_id)
            .await?
            .map(OrderBody::render);
        let vendor = db
            .vendors()
            .fetch_vendor_by_id(payment.vendor_id)
            .await?
            .map(VendorBody::render);
        let vendor_campaign = db
            .vendor_campaigns()
            .fetch_vendor_campaign_by_id(payment.vendor_campaign_id)
            .await?
            .map(VendorCampaignBody::render_flat);

        Ok(PaymentBody {
            id: payment.id,
            order_id: payment.order_id,
            vendor_id: payment.vendor_id,
            vendor_campaign_id: payment.vendor_campaign_id,
            transaction_id: payment.transaction_id,
            gateway: payment.gateway,
            amount: payment.amount,
            currency: payment.currency,
            status: payment.status,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
            order,
            vendor,
            vendor_campaign,
        })
    }
}

#[get("/payments")]
#[tracing::instrument(skip(db))]
async fn get_payments(db: Data<Box<dyn Database>>) -> Result<Envelope<Vec<PaymentBody>>, Error> {
    let payments = manager::get_payments(&***db).await?;

    let body = stream::iter(payments)
        .then(|payment| PaymentBody::render(&***db, payment))
        .try_collect()
        .await?;

    Ok(Envelope::ok("payments", body))
}

#[post("/payments")]
#[tracing::instrument(skip(db, body))]
async fn create_payment(
    db: Data<Box<dyn Database>>,
    body: Json<Value>,
) -> Result<Envelope<PaymentId>, Error> {
    let payment = manager::create_payment(&***db, &body).await?;

    Ok(Envelope::created("paymentId", payment.id))
}

#[get("/payments/{payment_id}")]
#[tracing::instrument(skip(db))]
async fn get_payment_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<PaymentId>,
) -> Result<Envelope<PaymentBody>, Error> {
    let payment_id = params.into_inner();

    let payment = manager::expect_payment_by_id(&***db, payment_id).await?;

    let body = PaymentBody::render(&***db, payment).await?;

    Ok(Envelope::ok("payment", body))
}

#[patch("/payments/{payment_id}")]
#[tracing::instrument(skip(db, body))]
async fn update_payment(
    db: Data<Box<dyn Database>>,
    params: Path<PaymentId>,
    body: Json<Value>,
) -> Result<Envelope<PaymentBody>, Error> {
    let payment_id = params.into_inner();

    let payment = manager::update_payment(&***db, payment_id, &body).await?;

    let body = PaymentBody::render(&***db, payment).await?;

    Ok(Envelope::ok("updatedPayment", body))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::json;

    use crate::database::test::{
        sample_order, sample_payment, sample_vendor, sample_vendor_campaign, MockDatabase,
    };
    use crate::database::StoreError;

    use super::*;

    #[actix_web::test]
    async fn duplicate_transaction_id_is_a_bad_request() {
        let mut db = MockDatabase::new().with_known_references();
        db.payments.on_insert_payment = Box::new(|_| Err(StoreError::UniqueViolation));
        let app = test_app!(db);

        let request = TestRequest::post()
            .uri("/api/backend/payments")
            .set_json(json!({
                "orderId": OrderId::new().to_string(),
                "vendorId": VendorId::new().to_string(),
                "vendorCampaignId": VendorCampaignId::new().to_string(),
                "transactionId": "txn-1",
                "amount": 10,
                "status": "Success",
            }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Transaction ID must be unique");
    }

    #[actix_web::test]
    async fn payment_expands_its_relations() {
        let mut db = MockDatabase::new();
        db.payments.on_fetch_payment_by_id =
            Box::new(|payment_id| Ok(Some(sample_payment(payment_id))));
        db.orders.on_fetch_order_by_id = Box::new(|order_id| Ok(Some(sample_order(order_id))));
        db.vendors.on_fetch_vendor_by_id = Box::new(|vendor_id| Ok(Some(sample_vendor(vendor_id))));
        db.vendor_campaigns.on_fetch_vendor_campaign_by_id = Box::new(|campaign_id| {
            Ok(Some(sample_vendor_campaign(campaign_id, VendorId::new())))
        });
        let app = test_app!(db);

        let request = TestRequest::get()
            .uri(&format!("/api/backend/payments/{}", PaymentId::new()))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        let payment = &body["payment"];
        assert_eq!(payment["order"]["id"], payment["orderId"]);
        assert_eq!(payment["vendor"]["id"], payment["vendorId"]);
        assert_eq!(payment["vendorCampaign"]["id"], payment["vendorCampaignId"]);
        assert!(payment["vendor"].get("password").is_none());
        assert!(payment["vendorCampaign"].get("vendor").is_none());
        assert_eq!(payment["status"], "Pending");
    }

    #[actix_web::test]
    async fn patch_on_missing_payment_is_not_found() {
        let mut db = MockDatabase::new();
        db.payments.on_update_payment = Box::new(|_, _| Err(StoreError::NotFound));
        let app = test_app!(db);

        let request = TestRequest::patch()
            .uri(&format!("/api/backend/payments/{}", PaymentId::new()))
            .set_json(json!({ "status": "Failed" }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "Payment not found");
    }
}
