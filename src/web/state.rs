//! Application state shared across handlers

use crate::config::Settings;
use crate::network::HttpClient;
use crate::providers::Provider;
use crate::search::Search;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search orchestrator
    pub search: Arc<Search>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, provider: Arc<dyn Provider>, client: HttpClient) -> Self {
        Self {
            settings: Arc::new(settings),
            search: Arc::new(Search::new(client, provider)),
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
