//! Submission state machine with thread-safe transitions.
//!
//! Enforces valid state transitions for one in-flight submission:
//! - Idle -> OptimisticallyDisplayed (local echo inserted, request sent)
//! - OptimisticallyDisplayed -> Reconciled (authoritative records merged)
//! - OptimisticallyDisplayed -> Failed (turn request failed)
//! - Reconciled -> Idle (slot ready for the next submission)
//! - Failed -> Idle (user dismissed or retried)

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::ClientError;

/// Lifecycle state of one submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionState {
    /// Nothing in flight. Ready to submit.
    Idle,
    /// The local placeholder is displayed; the server round-trip is pending.
    OptimisticallyDisplayed,
    /// The authoritative records replaced the placeholder.
    Reconciled,
    /// The round-trip failed; the placeholder is visibly marked.
    Failed,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "Idle"),
            SubmissionState::OptimisticallyDisplayed => write!(f, "OptimisticallyDisplayed"),
            SubmissionState::Reconciled => write!(f, "Reconciled"),
            SubmissionState::Failed => write!(f, "Failed"),
        }
    }
}

impl SubmissionState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SubmissionState) -> bool {
        matches!(
            (self, target),
            (SubmissionState::Idle, SubmissionState::OptimisticallyDisplayed)
                | (
                    SubmissionState::OptimisticallyDisplayed,
                    SubmissionState::Reconciled
                )
                | (
                    SubmissionState::OptimisticallyDisplayed,
                    SubmissionState::Failed
                )
                | (SubmissionState::Reconciled, SubmissionState::Idle)
                | (SubmissionState::Failed, SubmissionState::Idle)
        )
    }
}

/// Thread-safe state machine for submission transitions.
///
/// Wraps `SubmissionState` in an `Arc<Mutex<>>` so the submit flow and the
/// response handler can share it. All transitions are validated before being
/// applied.
#[derive(Debug, Clone)]
pub struct SubmissionTracker {
    state: Arc<Mutex<SubmissionState>>,
}

impl Default for SubmissionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionTracker {
    /// Create a new tracker initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SubmissionState::Idle)),
        }
    }

    /// Returns the current state.
    pub fn current(&self) -> SubmissionState {
        *self.state.lock().expect("state mutex poisoned")
    }

    /// Attempt to transition to the target state.
    pub fn transition(&self, target: SubmissionState) -> Result<(), ClientError> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        if state.can_transition_to(&target) {
            tracing::debug!("Submission state: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(ClientError::InvalidTransition {
                from: *state,
                to: target,
            })
        }
    }

    /// Force the tracker back to Idle (used for error recovery).
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("state mutex poisoned");
        tracing::warn!("Submission tracker reset to Idle from {}", *state);
        *state = SubmissionState::Idle;
    }
}

// =============================================================================
// Tests
// =============================================================================
