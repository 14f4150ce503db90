//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent `{error, details}` JSON response across
//! all endpoints, mapping pipeline errors to appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use mentormate_turn::TurnError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Optional structured details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid input.
    BadRequest(String),
    /// 401 Unauthorized - missing or invalid credentials.
    Unauthorized(String),
    /// 502 Bad Gateway - an upstream backend produced no usable result.
    UpstreamFailed {
        error: String,
        details: Option<serde_json::Value>,
    },
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::UpstreamFailed { error, details } => {
                (StatusCode::BAD_GATEWAY, error, details)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::EmptyMessage => ApiError::BadRequest(err.to_string()),
            TurnError::Storage(msg) => ApiError::Internal(msg),
            TurnError::Generation {
                detail,
                user_message,
            } => ApiError::UpstreamFailed {
                error: "Mentor reply generation failed".to_string(),
                // The user's message was persisted before the failure; hand
                // it back so the client can acknowledge receipt.
                details: Some(serde_json::json!({
                    "detail": detail,
                    "userMessage": *user_message,
                })),
            },
        }
    }
}
