//! API authentication via bearer tokens.
//!
//! Provides token generation, the token -> owner registry, and middleware
//! for validating `Authorization: Bearer <token>` headers on protected
//! endpoints. The handlers trust the injected `OwnerId` without
//! re-validating it.

use std::collections::HashMap;
use std::sync::Mutex;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::Rng;
use uuid::Uuid;

use crate::error::ErrorBody;
use crate::state::AppState;

/// Opaque caller identity resolved by the auth middleware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnerId(pub Uuid);

/// Generate a random 32-character hex token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

/// In-memory registry mapping bearer tokens to owner identities.
///
/// Stands in for the external authentication collaborator: a real login
/// flow would populate it, and everything downstream only ever sees the
/// resolved owner id.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: Mutex<HashMap<String, Uuid>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for the given owner.
    pub fn issue(&self, owner_id: Uuid) -> String {
        let token = generate_token();
        self.insert(token.clone(), owner_id);
        token
    }

    /// Register an existing token for the given owner.
    pub fn insert(&self, token: String, owner_id: Uuid) {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.insert(token, owner_id);
        }
    }

    /// Resolve a token to its owner, if known.
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        self.tokens.lock().ok()?.get(token).copied()
    }
}

/// Middleware that validates Bearer token authentication.
///
/// Extracts the token from `Authorization: Bearer <token>`, resolves it
/// through the token store, and injects the resulting `OwnerId` as a
/// request extension. Returns 401 if missing or invalid.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = req.headers().get("authorization");

    let value_str = match auth_header {
        Some(value) => match value.to_str() {
            Ok(s) => s,
            Err(_) => {
                return unauthorized("Invalid Authorization header encoding");
            }
        },
        None => {
            return unauthorized("Missing Authorization header");
        }
    };

    if let Some(token) = value_str.strip_prefix("Bearer ") {
        if let Some(owner_id) = state.tokens.resolve(token) {
            req.extensions_mut().insert(OwnerId(owner_id));
            return next.run(req).await;
        }
    }

    unauthorized("Invalid bearer token")
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            error: message.to_string(),
            details: None,
        }),
    )
        .into_response()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_random() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_token_store_issue_and_resolve() {
        let store = TokenStore::new();
        let owner = Uuid::new_v4();
        let token = store.issue(owner);
        assert_eq!(store.resolve(&token), Some(owner));
    }

    #[test]
    fn test_token_store_unknown_token() {
        let store = TokenStore::new();
        assert!(store.resolve("deadbeef").is_none());
    }

    #[test]
    fn test_token_store_insert_existing() {
        let store = TokenStore::new();
        let owner = Uuid::new_v4();
        store.insert("fixed-token".to_string(), owner);
        assert_eq!(store.resolve("fixed-token"), Some(owner));
    }

    #[test]
    fn test_tokens_map_to_distinct_owners() {
        let store = TokenStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let alice_token = store.issue(alice);
        let bob_token = store.issue(bob);

        assert_eq!(store.resolve(&alice_token), Some(alice));
        assert_eq!(store.resolve(&bob_token), Some(bob));
        assert_ne!(alice_token, bob_token);
    }
}
