//! Network layer
//!
//! Owns the outbound HTTP client shared by all providers.

mod client;

pub use client::HttpClient;
