use std::fmt::Display;
use std::io::{Error as IoError, ErrorKind};
use std::sync::Arc;

use actix_web::web::{self, Data, JsonConfig, PathConfig, QueryConfig, ServiceConfig};
use actix_web::{App, HttpServer, ResponseError};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// Builds a test service over `$db` with the real routes and a hasher that
/// only prefixes its input.
#[cfg(test)]
macro_rules! test_app {
    ($db:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(
                    Box::new($db) as Box<dyn crate::database::Database>
                ))
                .app_data(actix_web::web::Data::new(
                    crate::database::test::fake_hasher(),
                ))
                .configure(crate::configure),
        )
        .await
    };
}

pub mod campaign_property;
pub mod catalog;
pub mod config;
pub mod database;
pub mod envelope;
pub mod error;
pub mod order;
pub mod payment;
pub mod pipeline;
pub mod secret;
pub mod support;
pub mod typedid;
pub mod validation;
pub mod vendor;
pub mod vendor_campaign;

use catalog::CatalogSource;
use config::Config;
use database::{Database, MongoDatabase};
use error::Error;
use secret::{Argon2Hasher, SecretHasher};
use support::mailer::{Mailer, SmtpMailer};

/// Registers every route along with the extractor settings they rely on.
/// The store, hasher, mailer and catalogue are expected as app data.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .app_data(QueryConfig::default().error_handler(|err, _req| {
        // format query errors with custom format
        Error::InvalidQuery(err).into()
    }))
    .service(
        web::scope("/api/backend")
            .service(vendor::endpoints::get_vendors)
            .service(vendor::endpoints::create_vendor)
            .service(vendor::endpoints::get_vendor_by_id)
            .service(vendor::endpoints::update_vendor)
            .service(vendor::endpoints::replace_vendor)
            .service(vendor_campaign::endpoints::get_vendor_campaigns)
            .service(vendor_campaign::endpoints::create_vendor_campaign)
            .service(vendor_campaign::endpoints::get_vendor_campaign_by_id)
            .service(vendor_campaign::endpoints::update_vendor_campaign)
            .service(campaign_property::endpoints::get_properties)
            .service(campaign_property::endpoints::replace_properties)
            .service(campaign_property::endpoints::update_property)
            .service(order::endpoints::get_orders)
            .service(order::endpoints::create_order)
            .service(order::endpoints::get_order_by_id)
            .service(order::endpoints::update_order)
            .service(payment::endpoints::get_payments)
            .service(payment::endpoints::create_payment)
            .service(payment::endpoints::get_payment_by_id)
            .service(payment::endpoints::update_payment),
    )
    .service(catalog::endpoints::get_config)
    .service(support::endpoints::request_support)
    .default_service(web::to(|| async { Error::PathNotFound.error_response() }));
}

fn startup_error(err: impl Display) -> IoError {
    IoError::new(ErrorKind::Other, err.to_string())
}

/// Connects to the database once and serves until shut down. All workers
/// share the same connection pool.
pub async fn run(config: Config) -> Result<(), IoError> {
    info!(database = %config.database_name, "connecting to db");
    let client = Client::with_uri_str(&config.mongodb_uri)
        .await
        .map_err(startup_error)?;
    let db = MongoDatabase::initialize(client.database(&config.database_name))
        .await
        .map_err(startup_error)?;

    let hasher = Argon2Hasher::new(config.hash_iterations).map_err(startup_error)?;
    let mailer = SmtpMailer::new(&config).map_err(startup_error)?;
    let catalog = CatalogSource::new(&config.property_config_path);
    info!(path = %catalog.path().display(), "serving property catalogue");

    let db = Data::new(Box::new(db) as Box<dyn Database>);
    let hasher = Data::new(Arc::new(hasher) as Arc<dyn SecretHasher>);
    let mailer = Data::new(Box::new(mailer) as Box<dyn Mailer>);
    let catalog = Data::new(catalog);

    info!(address = %config.bind_address, "listening");
    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(hasher.clone())
            .app_data(mailer.clone())
            .app_data(catalog.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
