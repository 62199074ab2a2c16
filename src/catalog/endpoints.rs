use actix_web::get;
use actix_web::web::Data;

use crate::envelope::Envelope;
use crate::error::Error;

use super::{CatalogSource, PropertyCatalog};

#[get("/api/config")]
#[tracing::instrument(skip(source))]
async fn get_config(source: Data<CatalogSource>) -> Result<Envelope<PropertyCatalog>, Error> {
    let catalog = source.load().await?;

    Ok(Envelope::ok("data", catalog))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::App;
    use serde_json::{json, Value};

    use super::*;

    #[actix_web::test]
    async fn serves_the_catalogue() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "properties:\n  - property_key: channel\n    property_values:\n      - sms\n      - whatsapp"
        )
        .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(CatalogSource::new(file.path())))
                .service(get_config),
        )
        .await;

        let request = TestRequest::get().uri("/api/config").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": {
                    "properties": [
                        { "property_key": "channel", "property_values": ["sms", "whatsapp"] }
                    ]
                }
            })
        );
    }

    #[actix_web::test]
    async fn unreadable_catalogue_is_an_internal_error() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(CatalogSource::new("missing/tableData.yaml")))
                .service(get_config),
        )
        .await;

        let request = TestRequest::get().uri("/api/config").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "Failed to load config");
    }
}
