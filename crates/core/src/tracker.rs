//! Tracker state boundary.
//!
//! The tracker engine (emotional / relationship state variables) is an
//! external collaborator. The pipeline only ever sees its output as an
//! opaque, pre-formatted text block, ready for prompt injection.

use serde::{Deserialize, Serialize};

/// A pre-formatted tracker block for one character. Atomic string input to
/// the CharacterInfo section; the pipeline never parses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    /// Which character this state belongs to
    pub character_id: String,

    /// The formatted block, exactly as it should appear in the prompt
    pub content: String,
}

impl TrackerSnapshot {
    pub fn new(character_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            character_id: character_id.into(),
            content: content.into(),
        }
    }

    /// True when there is nothing worth injecting.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Capability for looking up tracker state.
///
/// Implemented by the external tracker engine; hosts without trackers use
/// [`NoTrackers`].
pub trait TrackerSource: Send + Sync {
    /// The current snapshot for a character, if one exists.
    fn snapshot_for(&self, character_id: &str) -> Option<TrackerSnapshot>;
}

/// A tracker source that never has state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrackers;

impl TrackerSource for NoTrackers {
    fn snapshot_for(&self, _character_id: &str) -> Option<TrackerSnapshot> {
        None
    }
}
