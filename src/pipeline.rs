//! The write path shared by every resource.
//!
//! Creates and partial updates both validate the raw body against a
//! [`Schema`], run the resource's [`TransformRegistry`] over the result and
//! hand column-keyed [`Fields`] to the store. Store failures come back as
//! [`StoreError`] and are translated here, so handlers never look at
//! database-specific error codes.

use std::fmt::Display;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::StoreError;
use crate::error::Error;
use crate::secret::TransformRegistry;
use crate::validation::{Fields, Schema};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Vendor,
    VendorCampaign,
    VendorCampaignProperty,
    Order,
    Payment,
}

impl Resource {
    pub fn name(self) -> &'static str {
        match self {
            Resource::Vendor => "Vendor",
            Resource::VendorCampaign => "Vendor Campaign",
            Resource::VendorCampaignProperty => "Vendor Campaign Property",
            Resource::Order => "Order",
            Resource::Payment => "Payment",
        }
    }

    /// Maps a store failure to the error reported for this resource.
    pub fn translate(self, error: StoreError) -> Error {
        match (self, error) {
            (resource, StoreError::NotFound) => Error::ResourceNotFound { resource },
            // transaction_id is the only unique column besides the primary key
            (Resource::Payment, StoreError::UniqueViolation) => Error::DuplicateTransactionId,
            (_, error) => Error::FailedDatabaseCall(error),
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(self.name())
    }
}

/// Validates `input`, applies transforms and shapes the result as `T`, ready
/// to be turned into a new record.
pub async fn prepare_create<T>(
    schema: &Schema,
    transforms: &TransformRegistry,
    input: &Value,
) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let fields = schema.validate(input)?;
    let fields = transforms.apply(fields).await?;

    serde_json::from_value(Value::Object(fields))
        .map_err(|err| Error::ExistentialState(format!("validated input did not fit: {}", err)))
}

/// Runs a partial update: validate, refuse empty patches, transform, persist
/// through `update` and translate its failure for `resource`.
///
/// `update` is never invoked when validation fails or nothing is left to
/// update.
pub async fn apply_partial_update<T, F, Fut>(
    resource: Resource,
    schema: &Schema,
    transforms: &TransformRegistry,
    input: &Value,
    update: F,
) -> Result<T, Error>
where
    F: FnOnce(Fields) -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let fields = schema.validate(input)?;

    if fields.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    let fields = transforms.apply(fields).await?;

    update(fields)
        .await
        .map_err(|err| resource.translate(err))
}
