//! Error types for client conversation state.

use crate::submission::SubmissionState;

/// Errors from the client-side conversation machinery.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("unknown pending message: {0}")]
    UnknownPending(uuid::Uuid),
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: SubmissionState,
        to: SubmissionState,
    },
    #[error("voice capture is already active")]
    CaptureActive,
    #[error("voice capture is not active")]
    CaptureInactive,
    #[error("voice capture is not supported in this environment")]
    CaptureUnsupported,
}
