//! Provider loader for initializing the active provider from configuration

use super::rentcast::Rentcast;
use super::traits::Provider;
use super::zillow::Zillow;
use crate::config::{ProviderKind, Settings};
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::info;

/// Construct the configured provider
///
/// A missing credential for the active provider is a fatal startup error;
/// the process must refuse to serve rather than fail every search later.
pub fn load_provider(settings: &Settings) -> Result<Arc<dyn Provider>> {
    let provider: Arc<dyn Provider> = match settings.provider.kind {
        ProviderKind::Zillow => {
            let Some(token) = settings.provider.apify_token.as_deref() else {
                bail!("APIFY_TOKEN is required for the zillow provider");
            };
            Arc::new(Zillow::new(token, &settings.provider))
        }
        ProviderKind::Rentcast => {
            let Some(key) = settings.provider.rentcast_api_key.as_deref() else {
                bail!("RENTCAST_API_KEY is required for the rentcast provider");
            };
            Arc::new(Rentcast::new(key, &settings.provider))
        }
    };

    info!("Loaded provider: {}", provider.name());
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_is_fatal() {
        let settings = Settings::default();
        let err = load_provider(&settings).unwrap_err();
        assert!(err.to_string().contains("APIFY_TOKEN"));
    }

    #[test]
    fn test_zillow_loads_with_token() {
        let mut settings = Settings::default();
        settings.provider.apify_token = Some("tok".to_string());
        let provider = load_provider(&settings).unwrap();
        assert_eq!(provider.name(), "zillow");
    }

    #[test]
    fn test_rentcast_loads_with_key() {
        let mut settings = Settings::default();
        settings.provider.kind = ProviderKind::Rentcast;
        settings.provider.rentcast_api_key = Some("key".to_string());
        let provider = load_provider(&settings).unwrap();
        assert_eq!(provider.name(), "rentcast");
    }
}
