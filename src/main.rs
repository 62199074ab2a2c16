use std::io::{Error as IoError, ErrorKind};

use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;
use vendor_backend::config::Config;

#[actix_web::main]
async fn main() -> Result<(), IoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    let config = Config::from_env().map_err(|err| IoError::new(ErrorKind::Other, err))?;
    info!(?config, "loaded configuration");

    vendor_backend::run(config).await
}
