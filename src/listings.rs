use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chat_workflow::sanitize::SanitizedQuery;

/// A car-for-sale record as held by the listings store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default)]
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: u64,
    #[serde(default, rename = "body_type")]
    pub body_type: Option<String>,
    #[serde(default, rename = "fuel_type")]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub mileage: Option<u64>,
    /// Dealer city
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "seating_capacity")]
    pub seating_capacity: Option<u32>,
    #[serde(default, rename = "highway_mpg")]
    pub highway_mpg: Option<f64>,
    #[serde(default, rename = "city_mpg")]
    pub city_mpg: Option<f64>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Display projection of a listing, the only shape queries hand back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingSummary {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seating_capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highway_mpg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_mpg: Option<f64>,
}

impl From<&Listing> for ListingSummary {
    fn from(listing: &Listing) -> Self {
        Self {
            make: listing.make.clone(),
            model: listing.model.clone(),
            year: listing.year,
            price: listing.price,
            body_type: listing.body_type.clone(),
            fuel_type: listing.fuel_type.clone(),
            transmission: listing.transmission.clone(),
            mileage: listing.mileage,
            location: listing.location.clone(),
            seating_capacity: listing.seating_capacity,
            highway_mpg: listing.highway_mpg,
            city_mpg: listing.city_mpg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub limit: usize,
}

/// Read access to car listings
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Returns at most `options.limit` listings matching `query`
    async fn find(
        &self,
        query: &SanitizedQuery,
        options: FindOptions,
    ) -> anyhow::Result<Vec<ListingSummary>>;

    /// Distinct makes among live listings, used for zero-result diagnostics
    async fn known_makes(&self, verified_only: bool) -> anyhow::Result<Vec<String>>;
}

/// Listings held in process memory, seeded at startup
#[derive(Debug, Clone, Default)]
pub struct MemoryListingStore {
    listings: Vec<Listing>,
}

impl MemoryListingStore {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// Loads a JSON array of listings from disk
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read listings file {}", path.display()))?;
        let listings: Vec<Listing> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse listings file {}", path.display()))?;
        info!("Loaded {} listings from {}", listings.len(), path.display());
        Ok(Self::new(listings))
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn find(
        &self,
        query: &SanitizedQuery,
        options: FindOptions,
    ) -> anyhow::Result<Vec<ListingSummary>> {
        let found: Vec<ListingSummary> = self
            .listings
            .iter()
            .filter(|listing| query.matches(listing))
            .take(options.limit)
            .map(ListingSummary::from)
            .collect();
        debug!("Memory store matched {} listings", found.len());
        Ok(found)
    }

    async fn known_makes(&self, verified_only: bool) -> anyhow::Result<Vec<String>> {
        let makes: BTreeSet<String> = self
            .listings
            .iter()
            .filter(|l| !l.is_deleted && (!verified_only || l.verified))
            .map(|l| l.make.clone())
            .collect();
        Ok(makes.into_iter().collect())
    }
}
