use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MentorError;

/// Who authored a message in a conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The owner of the conversation.
    User,
    /// The synthesized mentor persona.
    Mentor,
}

impl Role {
    /// Stable string form used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Mentor => "mentor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MentorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "mentor" => Ok(Role::Mentor),
            other => Err(MentorError::Validation(format!("unknown role: {}", other))),
        }
    }
}

/// One persisted utterance in a conversation.
///
/// Records are append-only: once created they are never mutated or deleted by
/// normal flow. Synthesized speech is never part of a persisted message; it
/// is attached transiently to the turn response only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned identifier, set at persistence time.
    pub id: Uuid,
    /// Owner of the conversation this message belongs to.
    pub owner_id: Uuid,
    pub role: Role,
    pub text: String,
    /// Second-precision creation time; ordering key within a conversation.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Tests
// =============================================================================
