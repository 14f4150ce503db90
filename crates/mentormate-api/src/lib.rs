//! Mentormate API crate - axum HTTP server and route handlers.
//!
//! Exposes the client-facing turn endpoint, the history endpoint, and a
//! health check, behind bearer-token authentication.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::{OwnerId, TokenStore};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
