//! Application state shared across all route handlers.
//!
//! AppState holds references to the turn orchestrator and the token
//! registry. It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use mentormate_turn::TurnOrchestrator;

use crate::auth::TokenStore;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// The conversation turn pipeline.
    pub orchestrator: Arc<TurnOrchestrator>,
    /// Bearer token -> owner registry.
    pub tokens: Arc<TokenStore>,
    /// Port the server binds on; used for CORS origins.
    pub port: u16,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with the given components.
    pub fn new(orchestrator: TurnOrchestrator, tokens: TokenStore, port: u16) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            tokens: Arc::new(tokens),
            port,
            start_time: Instant::now(),
        }
    }
}
