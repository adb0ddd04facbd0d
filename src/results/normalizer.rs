//! Normalizer for harmonizing heterogeneous provider records
//!
//! Providers return differently shaped JSON (scraper map markers, REST API
//! listings, building roll-ups). This module coerces each record into the
//! canonical [`Listing`], drops records missing required fields, and
//! deduplicates by identity key. The first occurrence wins and upstream
//! order is preserved.

use super::types::{Listing, NormalizedBatch};
use crate::query::ListingType;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use url::Url;

static FROM_PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)from\s*\$?([0-9][0-9,]*)").unwrap());
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());

/// Convert a raw provider payload into deduplicated canonical listings
///
/// `fallback` classifies records that carry no rental/sale marker of their
/// own (REST providers already scoped to one listing class). `retrieved_at`
/// stamps every listing in the batch, keeping a batch reproducible.
pub fn normalize(
    raw_items: &[Value],
    fallback: ListingType,
    retrieved_at: DateTime<Utc>,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    let mut seen = HashSet::new();

    for item in raw_items {
        let Some(listing) = normalize_record(item, fallback, retrieved_at) else {
            batch.dropped += 1;
            continue;
        };
        // First occurrence wins; later duplicates are discarded silently
        if seen.insert(listing.identity_key()) {
            batch.listings.push(listing);
        }
    }

    batch
}

/// Map one raw record, or None when price or address is missing
fn normalize_record(
    item: &Value,
    fallback: ListingType,
    retrieved_at: DateTime<Utc>,
) -> Option<Listing> {
    let obj = item.as_object()?;
    let is_building = obj.get("isBuilding").and_then(Value::as_bool).unwrap_or(false)
        || obj.contains_key("buildingId");

    let address = extract_address(obj.get("address"))
        .or_else(|| extract_address(obj.get("formattedAddress")))?;
    let price = extract_price(obj.get("price"))
        .or_else(|| extract_price(obj.get("unformattedPrice")))?;

    let listing_type = classify(obj).unwrap_or(fallback);
    // A query for "both" produces per-record classification upstream; a
    // record that still lacks a marker defaults to sale, as the scraper
    // labels rentals explicitly.
    let listing_type = match listing_type {
        ListingType::Both => ListingType::Sale,
        other => other,
    };

    let (beds, baths) = if is_building {
        // Building roll-ups expose unit minimums as representative values
        (
            extract_u32(obj.get("minBeds")),
            extract_f64(obj.get("minBaths")),
        )
    } else {
        (
            extract_u32(obj.get("beds")).or_else(|| extract_u32(obj.get("bedrooms"))),
            extract_f64(obj.get("baths")).or_else(|| extract_f64(obj.get("bathrooms"))),
        )
    };

    let (latitude, longitude) = extract_coordinates(obj);

    Some(Listing {
        price,
        listing_type,
        address,
        beds: beds.unwrap_or(0),
        baths: baths.unwrap_or(0.0),
        amenities: extract_amenities(obj),
        latitude,
        longitude,
        source_url: extract_url(obj.get("detailUrl"))
            .or_else(|| extract_url(obj.get("url")))
            .unwrap_or_default(),
        timestamp: retrieved_at,
    })
}

/// Rental/sale marker from scraper status fields, when present
fn classify(obj: &serde_json::Map<String, Value>) -> Option<ListingType> {
    for key in ["statusText", "statusType", "homeStatus"] {
        if let Some(status) = obj.get(key).and_then(Value::as_str) {
            let status = status.to_ascii_uppercase();
            if status.contains("RENT") {
                return Some(ListingType::Rental);
            }
            if status.contains("SALE") || status.contains("SOLD") {
                return Some(ListingType::Sale);
            }
        }
    }
    None
}

/// Extract a price from numbers or formatted strings
///
/// Handles "$1,250/mo", "From $388,000" and plain numerics. Zero and
/// negative values count as missing.
fn extract_price(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => {
            let price = n.as_f64()?;
            (price > 0.0 && price <= u32::MAX as f64).then(|| price as u32)
        }
        Value::String(s) => {
            let digits = if let Some(caps) = FROM_PRICE_RE.captures(s) {
                caps[1].replace(',', "")
            } else {
                s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
            };
            let price = digits.parse::<f64>().ok()?;
            (price > 0.0 && price <= u32::MAX as f64).then(|| price as u32)
        }
        _ => None,
    }
}

/// Extract an address from a plain string or a structured object
fn extract_address(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Object(parts) => {
            let joined: Vec<&str> = ["streetAddress", "line1", "city", "state", "zipcode", "zip"]
                .iter()
                .filter_map(|key| parts.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            (!joined.is_empty()).then(|| joined.join(", "))
        }
        _ => None,
    }
}

/// Numeric field that may arrive as a number or embedded in a string
fn extract_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => NUMBER_RE
            .captures(s)
            .and_then(|caps| caps[1].parse().ok()),
        _ => None,
    }
}

fn extract_u32(value: Option<&Value>) -> Option<u32> {
    let n = extract_f64(value)?;
    (n >= 0.0 && n <= u32::MAX as f64).then(|| n as u32)
}

/// Coordinates from a nested latLong object or flat fields
fn extract_coordinates(obj: &serde_json::Map<String, Value>) -> (Option<f64>, Option<f64>) {
    if let Some(lat_long) = obj.get("latLong").and_then(Value::as_object) {
        let lat = lat_long.get("latitude").and_then(Value::as_f64);
        let lon = lat_long.get("longitude").and_then(Value::as_f64);
        if lat.is_some() && lon.is_some() {
            return (lat, lon);
        }
    }
    (
        obj.get("latitude").and_then(Value::as_f64),
        obj.get("longitude").and_then(Value::as_f64),
    )
}

/// Amenity names from whichever array field the provider uses
fn extract_amenities(obj: &serde_json::Map<String, Value>) -> BTreeSet<String> {
    for key in ["amenities", "features"] {
        if let Some(items) = obj.get(key).and_then(Value::as_array) {
            return items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    BTreeSet::new()
}

/// Absolute listing URL; relative scraper paths are anchored to zillow.com
fn extract_url(value: Option<&Value>) -> Option<String> {
    let raw = value?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    let absolute = if raw.starts_with('/') {
        format!("https://www.zillow.com{}", raw)
    } else if !raw.starts_with("http://") && !raw.starts_with("https://") {
        format!("https://{}", raw)
    } else {
        raw.to_string()
    };
    Url::parse(&absolute).ok().map(|u| u.to_string())
}
