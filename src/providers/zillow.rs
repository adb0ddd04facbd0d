//! Zillow provider backed by an Apify-hosted scraper
//!
//! Builds a Zillow search URL carrying the encoded `searchQueryState` filter
//! blob, then asks the Apify actor to scrape it synchronously and return the
//! dataset items in one call.

use super::traits::*;
use crate::config::ProviderSettings;
use crate::query::SearchQuery;
use serde_json::{json, Map, Value};

/// Miles per degree of latitude, for radius-to-map-bounds conversion
const MILES_PER_DEGREE: f64 = 69.0;

/// Zillow search provider via an Apify actor
#[derive(Debug)]
pub struct Zillow {
    token: String,
    actor_id: String,
    base_url: String,
    max_results: u32,
}

impl Zillow {
    pub fn new(token: impl Into<String>, settings: &ProviderSettings) -> Self {
        Self {
            token: token.into(),
            actor_id: settings.zillow_actor_id.clone(),
            base_url: settings.apify_base_url.trim_end_matches('/').to_string(),
            max_results: settings.max_results,
        }
    }

    /// Build the Zillow search URL with an encoded `searchQueryState`
    fn build_search_url(&self, query: &SearchQuery) -> anyhow::Result<String> {
        let mut state = Map::new();
        state.insert("isMapVisible".to_string(), json!(true));

        if let (Some(lat), Some(lon)) = (query.latitude, query.longitude) {
            // One degree of longitude shrinks with cos(latitude); clamp so
            // polar coordinates cannot blow the bounds up to a full hemisphere.
            let lat_offset = query.radius_miles / MILES_PER_DEGREE;
            let lon_offset =
                query.radius_miles / (MILES_PER_DEGREE * lat.to_radians().cos().max(0.01));
            state.insert(
                "mapBounds".to_string(),
                json!({
                    "west": lon - lon_offset,
                    "east": lon + lon_offset,
                    "south": lat - lat_offset,
                    "north": lat + lat_offset,
                }),
            );
        }

        state.insert("filterState".to_string(), Value::Object(self.build_filter_state(query)));
        state.insert("isListVisible".to_string(), json!(true));

        let encoded = urlencoding::encode(&serde_json::to_string(&Value::Object(state))?)
            .into_owned();
        Ok(format!(
            "https://www.zillow.com/homes/?searchQueryState={}",
            encoded
        ))
    }

    fn build_filter_state(&self, query: &SearchQuery) -> Map<String, Value> {
        let mut filter = Map::new();
        // Newest listings first
        filter.insert("sort".to_string(), json!({"value": "days"}));

        if query.listing_type.includes_sales() {
            if let Some(bounds) = range_filter(query.min_sale_price, query.max_sale_price) {
                filter.insert("price".to_string(), bounds);
            }
        }
        if query.listing_type.includes_rentals() {
            if let Some(bounds) = range_filter(query.min_rent_price, query.max_rent_price) {
                filter.insert("monthlyPayment".to_string(), bounds);
            }
        }
        if let Some(bounds) = range_filter(query.min_beds, query.max_beds) {
            filter.insert("beds".to_string(), bounds);
        }
        if let Some(bounds) = range_filter(query.min_baths, query.max_baths) {
            filter.insert("baths".to_string(), bounds);
        }

        if !query.home_types.is_empty() {
            let mut types = Map::new();
            for home_type in &query.home_types {
                types.insert(home_type.as_str().to_string(), json!({"value": true}));
            }
            filter.insert("homeType".to_string(), Value::Object(types));
        }

        match query.listing_type {
            crate::query::ListingType::Sale => {
                filter.insert("isForSaleByAgent".to_string(), json!({"value": true}));
                filter.insert("isForSaleByOwner".to_string(), json!({"value": true}));
            }
            crate::query::ListingType::Rental => {
                filter.insert("isForRent".to_string(), json!({"value": true}));
            }
            crate::query::ListingType::Both => {}
        }

        filter
    }
}

impl Provider for Zillow {
    fn name(&self) -> &str {
        "zillow"
    }

    fn build_request(&self, query: &SearchQuery) -> anyhow::Result<ProviderRequest> {
        let search_url = self.build_search_url(query)?;
        let url = format!(
            "{}/v2/acts/{}/run-sync-get-dataset-items",
            self.base_url, self.actor_id
        );

        // MAP_MARKERS is the actor's fastest extraction mode; the markers
        // carry enough fields for the canonical listing.
        Ok(ProviderRequest::post(url)
            .param("token", &self.token)
            .json(json!({
                "searchUrls": [{"url": search_url}],
                "extractionMethod": "MAP_MARKERS",
                "maxItems": self.max_results,
            })))
    }

    fn parse_response(
        &self,
        response: ProviderResponse,
    ) -> Result<Vec<Value>, UpstreamError> {
        response.json_records()
    }
}

/// Build a `{"min": .., "max": ..}` object, or None when both ends are unset
fn range_filter<T: serde::Serialize + Copy>(min: Option<T>, max: Option<T>) -> Option<Value> {
    if min.is_none() && max.is_none() {
        return None;
    }
    let mut bounds = Map::new();
    if let Some(min) = min {
        bounds.insert("min".to_string(), json!(min));
    }
    if let Some(max) = max {
        bounds.insert("max".to_string(), json!(max));
    }
    Some(Value::Object(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{HomeType, ListingType, SearchQuery};

    fn settings() -> ProviderSettings {
        ProviderSettings::default()
    }

    fn austin_query() -> SearchQuery {
        SearchQuery {
            listing_type: ListingType::Rental,
            latitude: Some(30.2672),
            longitude: Some(-97.7431),
            radius_miles: 10.0,
            min_sale_price: None,
            max_sale_price: None,
            min_rent_price: Some(1000),
            max_rent_price: Some(3000),
            min_beds: Some(1),
            max_beds: None,
            min_baths: None,
            max_baths: None,
            home_types: vec![HomeType::Condo],
        }
    }

    /// Decode the searchQueryState blob back into JSON for assertions
    fn state_for(zillow: &Zillow, query: &SearchQuery) -> Value {
        let url = zillow.build_search_url(query).unwrap();
        assert!(url.starts_with("https://www.zillow.com/homes/?searchQueryState="));
        let decoded = urlencoding::decode(&url).unwrap();
        let state_json = decoded.split("searchQueryState=").nth(1).unwrap();
        serde_json::from_str(state_json).unwrap()
    }

    #[test]
    fn test_search_url_carries_filters() {
        let zillow = Zillow::new("tok", &settings());
        let state = state_for(&zillow, &austin_query());
        let filter = &state["filterState"];

        assert_eq!(filter["monthlyPayment"]["min"], 1000);
        assert_eq!(filter["monthlyPayment"]["max"], 3000);
        assert_eq!(filter["isForRent"]["value"], true);
        assert_eq!(filter["homeType"]["CONDO"]["value"], true);
        assert_eq!(filter["beds"]["min"], 1);
        assert!(state["mapBounds"].is_object());
    }

    #[test]
    fn test_map_bounds_enclose_center() {
        let zillow = Zillow::new("tok", &settings());
        let state = state_for(&zillow, &austin_query());

        let bounds = &state["mapBounds"];
        assert!(bounds["west"].as_f64().unwrap() < -97.7431);
        assert!(bounds["east"].as_f64().unwrap() > -97.7431);
        assert!(bounds["south"].as_f64().unwrap() < 30.2672);
        assert!(bounds["north"].as_f64().unwrap() > 30.2672);
    }

    #[test]
    fn test_no_coordinates_skips_map_bounds() {
        let zillow = Zillow::new("tok", &settings());
        let mut query = austin_query();
        query.latitude = None;
        query.longitude = None;

        let url = zillow.build_search_url(&query).unwrap();
        assert!(!url.contains("mapBounds"));
    }

    #[test]
    fn test_sale_query_uses_price_filter() {
        let zillow = Zillow::new("tok", &settings());
        let mut query = austin_query();
        query.listing_type = ListingType::Sale;
        query.min_rent_price = None;
        query.max_rent_price = None;
        query.min_sale_price = Some(300_000);
        query.max_sale_price = Some(800_000);

        let state = state_for(&zillow, &query);
        let filter = &state["filterState"];
        assert_eq!(filter["price"]["min"], 300_000);
        assert_eq!(filter["price"]["max"], 800_000);
        assert_eq!(filter["isForSaleByAgent"]["value"], true);
        assert!(filter.get("monthlyPayment").is_none());
    }

    #[test]
    fn test_actor_request_shape() {
        let zillow = Zillow::new("apify-tok", &settings());
        let request = zillow.build_request(&austin_query()).unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert!(request
            .url
            .ends_with("/v2/acts/maxcopell~zillow-scraper/run-sync-get-dataset-items"));
        assert_eq!(request.params.get("token"), Some(&"apify-tok".to_string()));

        let body = request.body.unwrap();
        assert_eq!(body["extractionMethod"], "MAP_MARKERS");
        assert_eq!(body["maxItems"], 500);
        assert!(body["searchUrls"][0]["url"]
            .as_str()
            .unwrap()
            .contains("zillow.com"));
    }
}
