//! Provider traits and types

use crate::network::HttpClient;
use crate::query::SearchQuery;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Typed failure of an upstream provider call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("provider request timed out (after retry)")]
    Timeout,
    #[error("provider unavailable: {detail}")]
    Unavailable { detail: String },
    #[error("provider quota or credential rejected")]
    QuotaExceeded,
    #[error("provider returned a malformed payload: {detail}")]
    MalformedResponse { detail: String },
}

impl UpstreamError {
    /// Stable machine-readable classification, safe to expose to clients
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "upstream_timeout",
            Self::Unavailable { .. } => "upstream_unavailable",
            Self::QuotaExceeded => "upstream_quota_exceeded",
            Self::MalformedResponse { .. } => "upstream_malformed_response",
        }
    }
}

/// HTTP request to be made against a provider
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: HashMap<String, String>,
    /// JSON body for POST requests
    pub body: Option<serde_json::Value>,
}

impl ProviderRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
        }
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a JSON body
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Successful HTTP response from a provider request
#[derive(Debug)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl ProviderResponse {
    /// Parse the body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, UpstreamError> {
        serde_json::from_str(&self.text).map_err(|e| UpstreamError::MalformedResponse {
            detail: e.to_string(),
        })
    }

    /// Parse the body as a JSON array of records
    pub fn json_records(&self) -> Result<Vec<serde_json::Value>, UpstreamError> {
        let value: serde_json::Value = self.json()?;
        match value {
            serde_json::Value::Array(items) => Ok(items),
            other => Err(UpstreamError::MalformedResponse {
                detail: format!("expected a JSON array, got {}", json_type_name(&other)),
            }),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Parameters a provider may not support natively
///
/// Providers report which query fields they could not translate so the
/// mismatch is logged instead of silently shaping results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnsupportedFilters {
    pub fields: Vec<String>,
}

/// An upstream property-data provider
///
/// Implementations translate a validated [`SearchQuery`] into their own
/// parameter shape and parse their payload back into raw JSON records for
/// the normalizer. The default [`fetch`](Provider::fetch) composes the two
/// around the shared [`HttpClient`].
#[async_trait]
pub trait Provider: std::fmt::Debug + Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    /// Build the HTTP request for a search
    fn build_request(&self, query: &SearchQuery) -> anyhow::Result<ProviderRequest>;

    /// Parse a successful HTTP response into raw listing records
    fn parse_response(&self, response: ProviderResponse)
        -> Result<Vec<serde_json::Value>, UpstreamError>;

    /// Query fields this provider cannot express upstream
    fn unsupported_filters(&self, _query: &SearchQuery) -> UnsupportedFilters {
        UnsupportedFilters::default()
    }

    /// Execute one search against this provider
    async fn fetch(
        &self,
        client: &HttpClient,
        query: &SearchQuery,
    ) -> Result<Vec<serde_json::Value>, UpstreamError> {
        let request = self.build_request(query).map_err(|e| UpstreamError::Unavailable {
            detail: format!("failed to build provider request: {}", e),
        })?;
        let response = client.execute(request).await?;
        self.parse_response(response)
    }
}
