//! The client's ordered conversation list and its reconciliation transitions.
//!
//! The list is a single shared value; both display panes are derived views
//! over it, so they can never drift apart. All mutation goes through three
//! pure transitions: `insert_optimistic`, `reconcile`, and `mark_failed`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use mentormate_core::types::{Message, Role};

use crate::error::ClientError;

/// Client-local identifier for a placeholder awaiting server confirmation.
///
/// Never collides with a server-assigned message id; it exists only until
/// reconciliation removes the placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PendingId(Uuid);

impl PendingId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PendingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a submission failed, as surfaced to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// 401-class failure; the stored credentials are no longer valid.
    SessionInvalid,
    /// Any other turn failure.
    SendFailed,
}

impl FailureKind {
    /// Whether the client must log out and return to the login screen.
    pub fn forces_logout(&self) -> bool {
        matches!(self, FailureKind::SessionInvalid)
    }

    /// The message shown inline next to the failed entry.
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::SessionInvalid => "Invalid session, please log in",
            FailureKind::SendFailed => "Failed to send message",
        }
    }
}

/// Optimistic local echo of a submitted message.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingMessage {
    pub id: PendingId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Set once the round-trip fails; the text stays visible either way.
    pub failure: Option<FailureKind>,
}

/// A mentor message with its transient audio attachment.
///
/// Audio exists only here; persisted records never carry it.
#[derive(Clone, Debug, PartialEq)]
pub struct MentorEntry {
    pub message: Message,
    pub audio: Option<Vec<u8>>,
    played: bool,
}

/// One entry in the conversation list.
#[derive(Clone, Debug, PartialEq)]
pub enum ConversationEntry {
    /// Local echo awaiting the server round-trip.
    Pending(PendingMessage),
    /// Authoritative persisted user message.
    User(Message),
    /// Authoritative mentor message, possibly with audio.
    Mentor(MentorEntry),
}

impl ConversationEntry {
    /// The role this entry renders as. Placeholders render as the user's own.
    pub fn role(&self) -> Role {
        match self {
            ConversationEntry::Pending(_) | ConversationEntry::User(_) => Role::User,
            ConversationEntry::Mentor(_) => Role::Mentor,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ConversationEntry::Pending(p) => &p.text,
            ConversationEntry::User(m) => &m.text,
            ConversationEntry::Mentor(e) => &e.message.text,
        }
    }
}

/// Ordered conversation list with pure reconciliation transitions.
#[derive(Clone, Debug, Default)]
pub struct ConversationState {
    entries: Vec<ConversationEntry>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the list from fetched history. Historical mentor messages have
    /// no audio and never trigger autoplay.
    pub fn from_history(messages: Vec<Message>) -> Self {
        let entries = messages
            .into_iter()
            .map(|message| match message.role {
                Role::User => ConversationEntry::User(message),
                Role::Mentor => ConversationEntry::Mentor(MentorEntry {
                    message,
                    audio: None,
                    played: true,
                }),
            })
            .collect();
        Self { entries }
    }

    /// Insert a placeholder for the submitted text at the tail of the list.
    ///
    /// Called before the server round-trip starts; the raw input text is
    /// echoed as-is.
    pub fn insert_optimistic(&mut self, text: &str) -> PendingId {
        let id = PendingId::new();
        self.entries.push(ConversationEntry::Pending(PendingMessage {
            id,
            text: text.to_string(),
            created_at: Utc::now(),
            failure: None,
        }));
        id
    }

    /// Replace the placeholder with the authoritative records.
    ///
    /// Removes the placeholder and appends the persisted user message and
    /// mentor message, in that order. Afterwards no entry carries the
    /// transient id.
    pub fn reconcile(
        &mut self,
        pending: PendingId,
        user_message: Message,
        mentor_message: Message,
        audio: Option<Vec<u8>>,
    ) -> Result<(), ClientError> {
        let index = self
            .pending_index(pending)
            .ok_or(ClientError::UnknownPending(pending.as_uuid()))?;
        self.entries.remove(index);
        self.entries.push(ConversationEntry::User(user_message));
        self.entries.push(ConversationEntry::Mentor(MentorEntry {
            message: mentor_message,
            audio,
            played: false,
        }));
        Ok(())
    }

    /// Mark the placeholder as failed, preserving the typed text.
    pub fn mark_failed(&mut self, pending: PendingId, kind: FailureKind) -> Result<(), ClientError> {
        let index = self
            .pending_index(pending)
            .ok_or(ClientError::UnknownPending(pending.as_uuid()))?;
        if let ConversationEntry::Pending(p) = &mut self.entries[index] {
            p.failure = Some(kind);
        }
        Ok(())
    }

    /// True while any placeholder is still awaiting its round-trip; drives
    /// the mentor-pane loading indicator.
    pub fn awaiting_reply(&self) -> bool {
        self.entries.iter().any(|entry| {
            matches!(entry, ConversationEntry::Pending(p) if p.failure.is_none())
        })
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The "mine" pane: every entry that is not the mentor's, placeholders
    /// included.
    pub fn mine(&self) -> Vec<&ConversationEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.role() != Role::Mentor)
            .collect()
    }

    /// The mentor pane: mentor entries only.
    pub fn mentor_pane(&self) -> Vec<&ConversationEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.role() == Role::Mentor)
            .collect()
    }

    /// Drain newly reconciled audio clips for automatic playback.
    ///
    /// Each clip is yielded exactly once across the life of the list;
    /// subsequent playback goes through `replay`.
    pub fn take_unplayed(&mut self) -> Vec<(Uuid, Vec<u8>)> {
        let mut clips = Vec::new();
        for entry in &mut self.entries {
            if let ConversationEntry::Mentor(mentor) = entry {
                if !mentor.played {
                    if let Some(audio) = &mentor.audio {
                        clips.push((mentor.message.id, audio.clone()));
                    }
                    mentor.played = true;
                }
            }
        }
        clips
    }

    /// Stored audio for manual replay. No re-synthesis happens; the clip
    /// attached at reconciliation time is reused.
    pub fn replay(&self, message_id: Uuid) -> Option<&[u8]> {
        self.entries.iter().find_map(|entry| match entry {
            ConversationEntry::Mentor(mentor) if mentor.message.id == message_id => {
                mentor.audio.as_deref()
            }
            _ => None,
        })
    }

    fn pending_index(&self, pending: PendingId) -> Option<usize> {
        self.entries.iter().position(|entry| {
            matches!(entry, ConversationEntry::Pending(p) if p.id == pending)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
