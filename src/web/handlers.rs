//! HTTP request handlers

use super::state::AppState;
use crate::query::SearchRequest;
use crate::search::SearchResponse;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// Service banner
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": format!("{} API is running", state.instance_name()),
        "version": crate::VERSION,
    }))
}

/// Liveness probe: cheap and side-effect free
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": state.instance_name(),
        "version": crate::VERSION,
    }))
}

/// Execute a property search
///
/// Validation and upstream failures stay business-level: the response is
/// always a 200 envelope with `success` reflecting the outcome. Only a
/// malformed JSON body is rejected at the transport level by the extractor.
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    Json(state.search.run(request).await)
}

/// Static example queries for documentation purposes
pub async fn search_examples() -> impl IntoResponse {
    Json(json!({
        "austin_rentals": {
            "listing_type": "rental",
            "latitude": 30.2672,
            "longitude": -97.7431,
            "radius_miles": 15.0,
            "min_rent_price": 1000,
            "max_rent_price": 4000,
            "min_beds": 1,
        },
        "downtown_condos": {
            "listing_type": "sale",
            "latitude": 30.2672,
            "longitude": -97.7431,
            "radius_miles": 5.0,
            "min_sale_price": 300000,
            "max_sale_price": 800000,
            "home_types": ["CONDO"],
        },
        "family_homes": {
            "listing_type": "both",
            "latitude": 30.2672,
            "longitude": -97.7431,
            "radius_miles": 20.0,
            "min_beds": 3,
            "min_baths": 2.0,
            "home_types": ["SINGLE_FAMILY"],
        },
    }))
}
