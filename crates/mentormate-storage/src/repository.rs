//! Owner-scoped repository over the messages table.
//!
//! Every statement is parameterized by owner id; there is no unscoped read
//! path, so one owner's conversation can never leak into another's.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use mentormate_core::error::MentorError;
use mentormate_core::types::{Message, Role};

use crate::db::Database;

/// Repository for conversation messages.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<Database>,
}

impl MessageRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append a new message to the owner's conversation.
    ///
    /// Assigns the server-authoritative id and creation time. The returned
    /// record is immediately visible to `list_by_owner` for the same owner.
    pub fn append(&self, owner_id: Uuid, role: Role, text: &str) -> Result<Message, MentorError> {
        let now = Utc::now();
        // Timestamps are stored at second precision; normalize up front so
        // the returned record equals a later read of the same row.
        let created_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);

        let message = Message {
            id: Uuid::new_v4(),
            owner_id,
            role,
            text: text.to_string(),
            created_at,
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, owner_id, role, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    message.id.to_string(),
                    message.owner_id.to_string(),
                    message.role.as_str(),
                    message.text,
                    message.created_at.timestamp(),
                ],
            )
            .map_err(|e| MentorError::Storage(format!("Failed to append message: {}", e)))?;
            Ok(())
        })?;

        tracing::debug!(id = %message.id, role = %message.role, "Message appended");

        Ok(message)
    }

    /// List the owner's messages ordered by creation time ascending,
    /// insertion order breaking ties.
    pub fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Message>, MentorError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, owner_id, role, text, created_at
                     FROM messages
                     WHERE owner_id = ?1
                     ORDER BY created_at ASC, seq ASC",
                )
                .map_err(|e| MentorError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![owner_id.to_string()], |row| {
                    Ok(row_to_message(row))
                })
                .map_err(|e| MentorError::Storage(e.to_string()))?;

            let mut messages = Vec::new();
            for row in rows {
                let message = row.map_err(|e| MentorError::Storage(e.to_string()))??;
                messages.push(message);
            }
            Ok(messages)
        })
    }

    /// Find a message by id, scoped to the owner.
    pub fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Message>, MentorError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, owner_id, role, text, created_at
                     FROM messages WHERE owner_id = ?1 AND id = ?2",
                )
                .map_err(|e| MentorError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(
                    rusqlite::params![owner_id.to_string(), id.to_string()],
                    |row| Ok(row_to_message(row)),
                )
                .optional()
                .map_err(|e| MentorError::Storage(e.to_string()))?;

            match result {
                Some(message) => Ok(Some(message?)),
                None => Ok(None),
            }
        })
    }

    /// Count all stored messages across owners.
    pub fn count(&self) -> Result<u64, MentorError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
                .map_err(|e| MentorError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

/// Decode a messages row into a Message.
fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, MentorError> {
    let id: String = row
        .get(0)
        .map_err(|e| MentorError::Storage(e.to_string()))?;
    let owner_id: String = row
        .get(1)
        .map_err(|e| MentorError::Storage(e.to_string()))?;
    let role: String = row
        .get(2)
        .map_err(|e| MentorError::Storage(e.to_string()))?;
    let text: String = row
        .get(3)
        .map_err(|e| MentorError::Storage(e.to_string()))?;
    let created_at: i64 = row
        .get(4)
        .map_err(|e| MentorError::Storage(e.to_string()))?;

    Ok(Message {
        id: Uuid::parse_str(&id)
            .map_err(|e| MentorError::Storage(format!("Invalid message id: {}", e)))?,
        owner_id: Uuid::parse_str(&owner_id)
            .map_err(|e| MentorError::Storage(format!("Invalid owner id: {}", e)))?,
        role: Role::from_str(&role)?,
        text,
        created_at: DateTime::from_timestamp(created_at, 0)
            .ok_or_else(|| MentorError::Storage(format!("Invalid timestamp: {}", created_at)))?,
    })
}

// =============================================================================
// Tests
// =============================================================================
