//! Web server module
//!
//! Axum-based HTTP layer exposing the search API.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
