//! HTTP client for making requests to upstream providers

use crate::config::OutgoingSettings;
use crate::providers::{HttpMethod, ProviderRequest, ProviderResponse, UpstreamError};
use anyhow::Result;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// HTTP client wrapper with provider-call policy baked in
///
/// One invocation performs at most two attempts: the initial request plus a
/// single retry when the failure was transient (timeout or connection
/// failure). HTTP-level failures are never retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    extra_headers: HashMap<String, String>,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client from outgoing settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs_f64(settings.request_timeout))
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            extra_headers: settings.extra_headers.clone(),
            user_agent: format!("propsearch-rs/{}", crate::VERSION),
        })
    }

    /// Execute a provider request, retrying once on transient network failure
    pub async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse, UpstreamError> {
        match self.send(&request).await {
            Ok(response) => Self::flatten(response).await,
            Err(e) if e.is_timeout() || e.is_connect() => {
                debug!("transient provider failure, retrying once: {}", e);
                match self.send(&request).await {
                    Ok(response) => Self::flatten(response).await,
                    Err(e) => Err(Self::classify_network(e)),
                }
            }
            Err(e) => Err(Self::classify_network(e)),
        }
    }

    async fn send(&self, request: &ProviderRequest) -> reqwest::Result<reqwest::Response> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        req_builder = req_builder
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");

        for (key, value) in &self.extra_headers {
            req_builder = req_builder.header(key, value);
        }
        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }
        if let Some(ref body) = request.body {
            req_builder = req_builder.json(body);
        }

        req_builder.send().await
    }

    fn classify_network(error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Unavailable {
                detail: error.to_string(),
            }
        }
    }

    /// Map HTTP status onto the error taxonomy and read the body
    async fn flatten(response: reqwest::Response) -> Result<ProviderResponse, UpstreamError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        match status {
            // Quota, credit and credential rejections as Apify/RentCast report them
            401 | 402 | 403 | 429 => return Err(UpstreamError::QuotaExceeded),
            s if !(200..300).contains(&s) => {
                return Err(UpstreamError::Unavailable {
                    detail: format!("HTTP {}", s),
                })
            }
            _ => {}
        }

        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::Unavailable {
                detail: format!("failed to read response body: {}", e),
            })?;

        Ok(ProviderResponse { status, text, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_client() -> HttpClient {
        let settings = OutgoingSettings {
            request_timeout: 0.2,
            ..Default::default()
        };
        HttpClient::with_settings(&settings).unwrap()
    }

    #[tokio::test]
    async fn test_client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[tokio::test]
    async fn test_success_passthrough() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listings"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[{\"price\": 1}]"))
            .mount(&server)
            .await;

        let response = fast_client()
            .execute(ProviderRequest::get(format!("{}/listings", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert!(response.text.contains("price"));
    }

    #[tokio::test]
    async fn test_timeout_retries_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let err = fast_client()
            .execute(ProviderRequest::get(format!("{}/slow", server.uri())))
            .await
            .unwrap_err();

        assert_eq!(err, UpstreamError::Timeout);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_quota_statuses_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quota"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = fast_client()
            .execute(ProviderRequest::get(format!("{}/quota", server.uri())))
            .await
            .unwrap_err();

        assert_eq!(err, UpstreamError::QuotaExceeded);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fast_client()
            .execute(ProviderRequest::get(format!("{}/down", server.uri())))
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Unavailable { .. }));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
