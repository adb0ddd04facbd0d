//! Settings structures for PropSearch-RS configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub provider: ProviderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            server: ServerSettings::default(),
            outgoing: OutgoingSettings::default(),
            provider: ProviderSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (PROPSEARCH_* prefix, plus provider tokens)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("PROPSEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("PROPSEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("PROPSEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("PROPSEARCH_PROVIDER") {
            if let Ok(kind) = val.parse() {
                self.provider.kind = kind;
            }
        }
        if let Ok(val) = std::env::var("APIFY_TOKEN") {
            self.provider.apify_token = Some(val);
        }
        if let Ok(val) = std::env::var("RENTCAST_API_KEY") {
            self.provider.rentcast_api_key = Some(val);
        }
    }

    /// The credential for the active provider, if configured
    pub fn active_token(&self) -> Option<&str> {
        match self.provider.kind {
            ProviderKind::Zillow => self.provider.apify_token.as_deref(),
            ProviderKind::Rentcast => self.provider.rentcast_api_key.as_deref(),
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug mode (raises log verbosity)
    pub debug: bool,
    /// Instance name reported by the banner and health endpoints
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "PropSearch".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// Base URL for the instance
    pub base_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
            base_url: None,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds. Scraper-backed providers can take
    /// tens of seconds to answer, so this is much higher than a typical API
    /// client default.
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send on every request
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Which upstream data provider to target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Zillow,
    Rentcast,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zillow" => Ok(Self::Zillow),
            "rentcast" => Ok(Self::Rentcast),
            other => Err(format!("unknown provider kind: {}", other)),
        }
    }
}

/// Upstream provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Active provider
    pub kind: ProviderKind,
    /// Apify API token (Zillow provider)
    pub apify_token: Option<String>,
    /// Apify actor that runs the Zillow scraper
    pub zillow_actor_id: String,
    /// Apify API base URL
    pub apify_base_url: String,
    /// RentCast API key
    pub rentcast_api_key: Option<String>,
    /// RentCast API base URL
    pub rentcast_base_url: String,
    /// Cap on records requested per search
    pub max_results: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Zillow,
            apify_token: None,
            zillow_actor_id: "maxcopell~zillow-scraper".to_string(),
            apify_base_url: "https://api.apify.com".to_string(),
            rentcast_api_key: None,
            rentcast_base_url: "https://api.rentcast.io".to_string(),
            max_results: crate::MAX_RESULTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert!(!settings.general.debug);
        assert_eq!(settings.provider.kind, ProviderKind::Zillow);
        assert_eq!(settings.provider.max_results, 500);
    }

    #[test]
    fn test_active_token_follows_provider() {
        let mut settings = Settings::default();
        settings.provider.apify_token = Some("apify-abc".to_string());
        settings.provider.rentcast_api_key = Some("rc-xyz".to_string());

        assert_eq!(settings.active_token(), Some("apify-abc"));

        settings.provider.kind = ProviderKind::Rentcast;
        assert_eq!(settings.active_token(), Some("rc-xyz"));
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("zillow".parse(), Ok(ProviderKind::Zillow));
        assert_eq!("RentCast".parse(), Ok(ProviderKind::Rentcast));
        assert!("redfin".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_settings_from_yaml() {
        let yaml = r#"
general:
  instance_name: "My PropSearch"
server:
  port: 9000
provider:
  kind: rentcast
  max_results: 100
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.general.instance_name, "My PropSearch");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.provider.kind, ProviderKind::Rentcast);
        assert_eq!(settings.provider.max_results, 100);
        // Sections not present fall back to defaults
        assert_eq!(settings.outgoing.pool_maxsize, 20);
    }
}
