//! Canonical listing type definitions

use crate::query::ListingType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A property listing in the canonical, provider-independent shape
///
/// Created only by the normalizer and never mutated afterwards. `price` is
/// dollars: monthly rent for rentals, purchase price for sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub price: u32,
    /// rental or sale (never "both", which is a query concept)
    pub listing_type: ListingType,
    pub address: String,
    pub beds: u32,
    pub baths: f64,
    pub amenities: BTreeSet<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source_url: String,
    /// When this listing was retrieved
    pub timestamp: DateTime<Utc>,
}

impl Listing {
    /// Key used to detect duplicates within a provider response
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::new(&self.address, &self.source_url)
    }
}

/// Normalized `(address, source_url)` pair identifying one listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    address: String,
    source_url: String,
}

impl IdentityKey {
    pub fn new(address: &str, source_url: &str) -> Self {
        Self {
            address: normalize_part(address),
            source_url: normalize_part(source_url),
        }
    }
}

/// Collapse whitespace and case so cosmetic differences do not defeat dedup
fn normalize_part(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Output of one normalization pass over a raw payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    /// Listings in upstream order, minus dropped and duplicate records
    pub listings: Vec<Listing>,
    /// Records rejected for missing required fields (price or address)
    pub dropped: usize,
}

impl NormalizedBatch {
    pub fn count(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
