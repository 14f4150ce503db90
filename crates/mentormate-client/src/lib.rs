//! Client-side conversation state for Mentormate.
//!
//! Models the optimistic-echo/reconciliation lifecycle of a submitted
//! message as explicit state with pure transition functions, plus the
//! role-filtered panes and the speech-capture capability seam.

pub mod conversation;
pub mod error;
pub mod submission;
pub mod voice;

pub use conversation::{
    ConversationEntry, ConversationState, FailureKind, MentorEntry, PendingId, PendingMessage,
};
pub use error::ClientError;
pub use submission::{SubmissionState, SubmissionTracker};
pub use voice::{toggle_capture, SpeechCapture, UnsupportedCapture};
