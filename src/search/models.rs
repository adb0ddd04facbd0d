//! Response envelope models

use crate::providers::UpstreamError;
use crate::query::{FieldViolation, ValidationError};
use crate::results::{Listing, NormalizedBatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public message for any upstream failure; provider error text never leaks
const UPSTREAM_FAILURE_MESSAGE: &str =
    "Property search is temporarily unavailable, please try again later";

/// Envelope returned for every search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub count: usize,
    pub message: String,
    pub listings: Vec<Listing>,
    /// Upstream records dropped during normalization (informational)
    pub dropped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    pub timestamp: DateTime<Utc>,
}

/// Machine-readable failure detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable classification, e.g. `validation_error` or `upstream_timeout`
    pub kind: String,
    /// Per-field violations (validation failures only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

impl SearchResponse {
    /// Successful search
    pub fn found(batch: NormalizedBatch, message: String) -> Self {
        Self {
            success: true,
            count: batch.count(),
            message,
            listings: batch.listings,
            dropped: batch.dropped,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Rejected before any upstream call was made
    pub fn validation_failure(error: ValidationError) -> Self {
        Self {
            success: false,
            count: 0,
            message: format!("Invalid search query: {}", error.summary()),
            listings: Vec::new(),
            dropped: 0,
            error: Some(ErrorDetail {
                kind: "validation_error".to_string(),
                violations: error.violations,
            }),
            timestamp: Utc::now(),
        }
    }

    /// Upstream call failed after the client's retry
    pub fn upstream_failure(error: &UpstreamError) -> Self {
        Self {
            success: false,
            count: 0,
            message: UPSTREAM_FAILURE_MESSAGE.to_string(),
            listings: Vec::new(),
            dropped: 0,
            error: Some(ErrorDetail {
                kind: error.kind().to_string(),
                violations: Vec::new(),
            }),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SearchQuery, SearchRequest};

    #[test]
    fn test_validation_failure_envelope() {
        let request = SearchRequest {
            radius_miles: Some(-1.0),
            ..Default::default()
        };
        let error = SearchQuery::from_request(request).unwrap_err();
        let response = SearchResponse::validation_failure(error);

        assert!(!response.success);
        assert_eq!(response.count, 0);
        let detail = response.error.unwrap();
        assert_eq!(detail.kind, "validation_error");
        assert_eq!(detail.violations[0].field, "radius_miles");
    }

    #[test]
    fn test_upstream_failure_hides_detail() {
        let error = UpstreamError::Unavailable {
            detail: "connection refused to api.apify.com".to_string(),
        };
        let response = SearchResponse::upstream_failure(&error);

        assert!(!response.success);
        assert!(!response.message.contains("apify"));
        assert_eq!(response.error.unwrap().kind, "upstream_unavailable");
    }
}
