//! Canonical listing results
//!
//! Converts raw provider payloads into the provider-independent listing
//! representation and owns deduplication.

mod normalizer;
mod types;

pub use normalizer::normalize;
pub use types::{IdentityKey, Listing, NormalizedBatch};
