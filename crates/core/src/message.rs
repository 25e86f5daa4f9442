//! Message and history domain types.
//!
//! `Message` is the full session-storage record: soft-deletable, editable
//! with an audit trail, never removed. `HistoryEntry` is the narrow
//! `(role, content)` projection handed to the LLM transport layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI character
    Assistant,
    /// System instructions
    System,
}

/// A single message in a session's history.
///
/// Lifecycle: created once per turn, then only soft-deleted or edited.
/// An edit pushes the previous content onto `edit_history` rather than
/// creating a new message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// When this message was created
    pub created_at: DateTime<Utc>,

    /// Soft-delete flag. Deleted messages are excluded from every history
    /// selection but remain in storage.
    #[serde(default)]
    pub is_deleted: bool,

    /// The character this message belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,

    /// Prior contents, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edit_history: Vec<MessageEdit>,
}

/// A superseded version of a message's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEdit {
    /// The content before the edit
    pub content: String,
    /// When the edit happened
    pub edited_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            is_deleted: false,
            character_id: None,
            edit_history: Vec::new(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Attach a character id.
    pub fn with_character(mut self, character_id: impl Into<String>) -> Self {
        self.character_id = Some(character_id.into());
        self
    }

    /// Mark this message deleted. The record stays in storage.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Replace the content, recording the previous version in
    /// `edit_history`.
    pub fn edit(&mut self, new_content: impl Into<String>) {
        let previous = std::mem::replace(&mut self.content, new_content.into());
        self.edit_history.push(MessageEdit {
            content: previous,
            edited_at: Utc::now(),
        });
    }
}

/// Role restriction for transport-facing history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

/// A `(role, content)` pair in the bounded history window handed to the
/// transport layer. System messages never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub content: String,
}

impl HistoryEntry {
    /// Project a stored message into a history entry. Returns `None` for
    /// system messages — they have no place in the transport window.
    pub fn from_message(message: &Message) -> Option<Self> {
        let role = match message.role {
            Role::User => HistoryRole::User,
            Role::Assistant => HistoryRole::Assistant,
            Role::System => return None,
        };
        Some(Self {
            role,
            content: message.content.clone(),
        })
    }
}
