//! Error types for the turn pipeline.

use mentormate_core::error::MentorError;
use mentormate_core::types::Message;

/// Errors from a single conversation turn.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("message text must not be empty")]
    EmptyMessage,
    #[error("storage error: {0}")]
    Storage(String),
    /// The generation backend produced no usable reply. The user's message
    /// was already persisted, so it rides along for the client to
    /// acknowledge receipt.
    #[error("generation failed: {detail}")]
    Generation {
        detail: String,
        user_message: Box<Message>,
    },
}

impl From<MentorError> for TurnError {
    fn from(err: MentorError) -> Self {
        TurnError::Storage(err.to_string())
    }
}
