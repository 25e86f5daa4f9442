//! Character value object.
//!
//! Immutable per version: any edit bumps `updated_at`, which changes
//! `version_key()` and invalidates cached prompt blocks built from the old
//! version. Text fields may contain `{{user}}`/`{{char}}` placeholders;
//! resolving them is the assembly crate's job, never done here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A roleplay character definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Unique character ID
    pub id: String,

    /// Display name, also the value substituted for `{{char}}`
    pub name: String,

    // --- Narrative attributes ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking_style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,

    /// Greeting shown when a session starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_message: Option<String>,

    /// Character-specific system prompt, appended to the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    // --- Lexical attributes ---
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weaknesses: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hobbies: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub likes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dislikes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbal_tics: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    // --- Version stamps ---
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Character {
    /// Create a character with only identity fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            personality: None,
            appearance: None,
            speaking_style: None,
            background: None,
            scenario: None,
            first_message: None,
            system_prompt: None,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            hobbies: Vec::new(),
            likes: Vec::new(),
            dislikes: Vec::new(),
            verbal_tics: Vec::new(),
            tags: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Cache key identifying this character at its current version.
    /// Falls back to `created_at` when the character was never edited.
    pub fn version_key(&self) -> String {
        let stamp = self.updated_at.unwrap_or(self.created_at);
        format!("{}_{}", self.id, stamp.timestamp_millis())
    }
}
