//! RentCast listings provider
//!
//! Talks to the RentCast REST API directly. Unlike the scraper-backed Zillow
//! provider it answers quickly, but its listing endpoints accept fewer
//! filters; anything it cannot express upstream is reported through
//! [`Provider::unsupported_filters`] and logged by the orchestrator.

use super::traits::*;
use crate::config::ProviderSettings;
use crate::query::{HomeType, SearchQuery};
use serde_json::Value;

/// RentCast API provider
#[derive(Debug)]
pub struct Rentcast {
    api_key: String,
    base_url: String,
    max_results: u32,
}

impl Rentcast {
    pub fn new(api_key: impl Into<String>, settings: &ProviderSettings) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: settings.rentcast_base_url.trim_end_matches('/').to_string(),
            max_results: settings.max_results,
        }
    }

    /// RentCast serves one listing class per endpoint. "both" falls back to
    /// rentals, the class the original integration targeted.
    fn endpoint(&self, query: &SearchQuery) -> &'static str {
        if query.listing_type.includes_rentals() {
            "/v1/listings/rental/long-term"
        } else {
            "/v1/listings/sale"
        }
    }
}

/// RentCast's name for a property type, where it has one
fn property_type(home_type: HomeType) -> &'static str {
    match home_type {
        HomeType::Condo => "Condo",
        HomeType::SingleFamily => "Single Family",
        HomeType::Townhouse => "Townhouse",
        HomeType::MultiFamily => "Multi-Family",
        HomeType::Apartment => "Apartment",
        HomeType::Manufactured => "Manufactured",
        HomeType::Lot => "Land",
    }
}

impl Provider for Rentcast {
    fn name(&self) -> &str {
        "rentcast"
    }

    fn build_request(&self, query: &SearchQuery) -> anyhow::Result<ProviderRequest> {
        let url = format!("{}{}", self.base_url, self.endpoint(query));
        let mut request = ProviderRequest::get(url)
            .header("X-Api-Key", &self.api_key)
            .header("Accept", "application/json")
            .param("status", "Active")
            .param("limit", self.max_results.min(500).to_string());

        if let (Some(lat), Some(lon)) = (query.latitude, query.longitude) {
            request = request
                .param("latitude", lat.to_string())
                .param("longitude", lon.to_string())
                .param("radius", query.radius_miles.to_string());
        }

        // The API filters on exact bed/bath counts only
        if let (Some(min), Some(max)) = (query.min_beds, query.max_beds) {
            if min == max {
                request = request.param("bedrooms", min.to_string());
            }
        }
        if let (Some(min), Some(max)) = (query.min_baths, query.max_baths) {
            if min == max {
                request = request.param("bathrooms", min.to_string());
            }
        }

        if let Some(first) = query.home_types.first() {
            request = request.param("propertyType", property_type(*first));
        }

        Ok(request)
    }

    fn parse_response(
        &self,
        response: ProviderResponse,
    ) -> Result<Vec<Value>, UpstreamError> {
        response.json_records()
    }

    fn unsupported_filters(&self, query: &SearchQuery) -> UnsupportedFilters {
        let mut fields = Vec::new();
        if query.min_sale_price.is_some() || query.max_sale_price.is_some() {
            fields.push("sale_price".to_string());
        }
        if query.min_rent_price.is_some() || query.max_rent_price.is_some() {
            fields.push("rent_price".to_string());
        }
        if query.min_beds.is_some() && query.min_beds != query.max_beds {
            fields.push("beds".to_string());
        }
        if query.min_baths.is_some() && query.min_baths != query.max_baths {
            fields.push("baths".to_string());
        }
        if query.home_types.len() > 1 {
            fields.push("home_types".to_string());
        }
        UnsupportedFilters { fields }
    }
}
