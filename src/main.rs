//! PropSearch-RS: a property-search API service written in Rust
//!
//! This is the main entry point for the application.

use anyhow::{Context, Result};
use propsearch_rs::{
    config::Settings,
    network::HttpClient,
    providers::load_provider,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so the debug flag can raise log verbosity
    let settings = load_settings()?;

    // Initialize logging
    let default_level = if settings.general.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("Starting PropSearch-RS v{}", propsearch_rs::VERSION);
    info!("Instance: {}", settings.general.instance_name);

    // A provider without a credential must fail here, not on the first search
    let provider = load_provider(&settings)?;

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    // Create application state and router
    let state = AppState::new(settings.clone(), provider, client);
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(
        settings
            .server
            .bind_address
            .parse()
            .context("invalid bind address")?,
        settings.server.port,
    );

    info!("Starting server on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load settings from file or use defaults, then apply environment overrides
fn load_settings() -> Result<Settings> {
    // Check environment variable first
    if let Ok(path) = std::env::var("PROPSEARCH_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    // Check for settings file in the usual locations
    let paths = [
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/propsearch/settings.yml"),
        dirs::config_dir()
            .map(|p| p.join("propsearch-rs/settings.yml"))
            .unwrap_or_default(),
    ];

    for path in paths.iter() {
        if path.exists() {
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    // Use defaults
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}
