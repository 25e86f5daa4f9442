//! Persona value object — "the user" inside the roleplay frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user-side identity in a session. Substituted for `{{user}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Unique persona ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Role within the roleplay frame (e.g. "childhood friend")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Free-text additional settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_settings: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Persona {
    /// Create a persona with only identity fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: None,
            other_settings: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Cache key identifying this persona at its current version.
    pub fn version_key(&self) -> String {
        let stamp = self.updated_at.unwrap_or(self.created_at);
        format!("{}_{}", self.id, stamp.timestamp_millis())
    }
}
