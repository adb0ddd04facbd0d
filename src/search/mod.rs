//! Search orchestration module
//!
//! Composes query validation, the upstream provider call, and result
//! normalization into one request pipeline, and shapes the response envelope.

mod executor;
mod models;

pub use executor::Search;
pub use models::*;
