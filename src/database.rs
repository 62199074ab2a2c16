use std::fmt::Display;

use mongodb::bson::{self, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Collection;

use crate::campaign_property::db::VendorCampaignPropertyStore;
use crate::campaign_property::VendorCampaignProperty;
use crate::order::db::OrderStore;
use crate::order::Order;
use crate::payment::db::PaymentStore;
use crate::payment::Payment;
use crate::validation::Fields;
use crate::vendor::db::VendorStore;
use crate::vendor::Vendor;
use crate::vendor_campaign::db::VendorCampaignStore;
use crate::vendor_campaign::VendorCampaign;
use crate::{campaign_property, order, payment, vendor, vendor_campaign};

pub type MongoVendorStore = Collection<Vendor>;
pub type MongoVendorCampaignStore = Collection<VendorCampaign>;
pub type MongoVendorCampaignPropertyStore = Collection<VendorCampaignProperty>;
pub type MongoOrderStore = Collection<Order>;
pub type MongoPaymentStore = Collection<Payment>;

const DUPLICATE_KEY: i32 = 11000;

/// Failure reported by a store, independent of the database behind it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    NotFound,
    UniqueViolation,
    Other(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            StoreError::NotFound => f.write_str("no matching record"),
            StoreError::UniqueViolation => f.write_str("unique constraint violated"),
            StoreError::Other(detail) => f.write_str(detail),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(error: mongodb::error::Error) -> StoreError {
        if is_duplicate_key(&error) {
            StoreError::UniqueViolation
        } else {
            StoreError::Other(error.to_string())
        }
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(error: bson::ser::Error) -> StoreError {
        StoreError::Other(error.to_string())
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match &*error.kind {
        ErrorKind::Write(WriteFailure::WriteError(err)) => err.code == DUPLICATE_KEY,
        ErrorKind::Command(err) => err.code == DUPLICATE_KEY,
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .iter()
            .flatten()
            .any(|err| err.code == DUPLICATE_KEY),
        _ => false,
    }
}

/// `$set` document for the given columns.
pub fn set_fields(fields: &Fields) -> Result<Document, StoreError> {
    let set = bson::to_document(fields)?;

    Ok(bson::doc! { "$set": set })
}

/// `$set` document for the given columns that also bumps `updated_at`.
pub fn stamped_update(fields: &Fields) -> Result<Document, StoreError> {
    let mut set = bson::to_document(fields)?;
    set.insert("updated_at", bson::DateTime::now());

    Ok(bson::doc! { "$set": set })
}

pub fn updated_document() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

pub trait Database: Send + Sync {
    fn vendors(&self) -> &dyn VendorStore;
    fn vendor_campaigns(&self) -> &dyn VendorCampaignStore;
    fn vendor_campaign_properties(&self) -> &dyn VendorCampaignPropertyStore;
    fn orders(&self) -> &dyn OrderStore;
    fn payments(&self) -> &dyn PaymentStore;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    vendors: MongoVendorStore,
    vendor_campaigns: MongoVendorCampaignStore,
    vendor_campaign_properties: MongoVendorCampaignPropertyStore,
    orders: MongoOrderStore,
    payments: MongoPaymentStore,
}

impl MongoDatabase {
    pub async fn initialize(db: mongodb::Database) -> Result<MongoDatabase, StoreError> {
        // fail at startup rather than on the first request
        db.run_command(bson::doc! { "ping": 1 }, None).await?;

        vendor::db::initialize(&db).await?;
        vendor_campaign::db::initialize(&db).await?;
        campaign_property::db::initialize(&db).await?;
        order::db::initialize(&db).await?;
        payment::db::initialize(&db).await?;

        Ok(MongoDatabase {
            vendors: db.collection(vendor::db::VENDORS),
            vendor_campaigns: db.collection(vendor_campaign::db::VENDOR_CAMPAIGNS),
            vendor_campaign_properties: db
                .collection(campaign_property::db::VENDOR_CAMPAIGN_PROPERTIES),
            orders: db.collection(order::db::ORDERS),
            payments: db.collection(payment::db::PAYMENTS),
        })
    }
}

impl Database for MongoDatabase {
    fn vendors(&self) -> &dyn VendorStore {
        &self.vendors
    }

    fn vendor_campaigns(&self) -> &dyn VendorCampaignStore {
        &self.vendor_campaigns
    }

    fn vendor_campaign_properties(&self) -> &dyn VendorCampaignPropertyStore {
        &self.vendor_campaign_properties
    }

    fn orders(&self) -> &dyn OrderStore {
        &self.orders
    }

    fn payments(&self) -> &dyn PaymentStore {
        &self.payments
    }
}
