//! Configuration module for PropSearch-RS
//!
//! Handles loading settings from YAML files and environment variables.
//! Settings are loaded once at startup and injected into the components
//! that need them; there is no ambient global configuration.

mod settings;

pub use settings::*;
