//! The property catalogue: the keys a campaign property may use and the
//! values offered for each. It lives in a YAML file next to the service and
//! is re-read on every request, so edits show up without a restart.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub mod endpoints;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyCatalog {
    pub properties: Vec<PropertyConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub property_key: String,
    pub property_values: Vec<String>,
}

/// Where the catalogue is read from.
#[derive(Clone, Debug)]
pub struct CatalogSource {
    path: PathBuf,
}

impl CatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> CatalogSource {
        CatalogSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<PropertyCatalog, Error> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| Error::FailedToLoadConfig(err.to_string()))?;

        PropertyCatalog::parse(&content)
    }
}

impl PropertyCatalog {
    pub fn parse(content: &str) -> Result<PropertyCatalog, Error> {
        serde_yaml::from_str(content).map_err(|err| Error::FailedToLoadConfig(err.to_string()))
    }
}
