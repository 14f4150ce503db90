//! Route handler functions for all API endpoints.
//!
//! Each handler extracts the caller identity injected by the auth
//! middleware, interacts with the turn orchestrator, and returns JSON.

use axum::extract::State;
use axum::{Extension, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use mentormate_core::types::Message;

use crate::auth::OwnerId;
use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// Combined payload of one successful turn.
///
/// `audio` is the base64-encoded synthesized speech, or `null` when the
/// turn degraded to text-only on a synthesis failure.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub user_message: Message,
    pub mentor_message: Message,
    pub audio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub total_messages: u64,
}

// =============================================================================
// Handler functions
// =============================================================================

/// POST /messages - process one conversation turn.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(OwnerId(owner_id)): Extension<OwnerId>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let reply = state.orchestrator.submit_turn(owner_id, &req.text).await?;

    Ok(Json(TurnResponse {
        user_message: reply.user_message,
        mentor_message: reply.mentor_message,
        audio: reply.audio.map(|bytes| BASE64.encode(bytes)),
    }))
}

/// GET /messages - the caller's conversation history, oldest first.
///
/// Audio is never re-attached to history; it exists only on the turn
/// response that produced it.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(OwnerId(owner_id)): Extension<OwnerId>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.orchestrator.history(owner_id)?;
    Ok(Json(messages))
}

/// GET /health - liveness and basic stats. No auth required.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let total_messages = state.orchestrator.stored_messages()?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        total_messages,
    }))
}
