//! Pipeline configuration.
//!
//! Consumed as plain parameters — there is no config file or environment
//! lookup in this core. Hosts deserialize these from wherever their
//! settings live.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How much conversation context to carry, from full to minimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStage {
    /// Full context window (default)
    #[default]
    Full,
    /// Lighter window for constrained models
    Light,
    /// Minimal window
    Minimal,
}

impl ContextStage {
    /// The message ceiling for this stage.
    pub fn max_context_messages(self) -> usize {
        match self {
            Self::Full => 40,
            Self::Light => 20,
            Self::Minimal => 10,
        }
    }
}

/// Configuration for history selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Upper bound on selected history entries
    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,

    /// Floor on how many of the most recent turns must be included
    /// regardless of relevance score
    #[serde(default = "default_min_recent_messages")]
    pub min_recent_messages: usize,

    /// TTL for the per-session selection memo
    #[serde(default = "default_history_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_max_context_messages() -> usize {
    40
}
fn default_min_recent_messages() -> usize {
    min_recent_for(default_max_context_messages())
}
fn default_history_cache_ttl_secs() -> u64 {
    5
}

/// `max(5, max_context_messages / 4)`
fn min_recent_for(max_context_messages: usize) -> usize {
    (max_context_messages / 4).max(5)
}

impl HistoryConfig {
    /// Configuration for a context stage, with the derived recency floor.
    pub fn for_stage(stage: ContextStage) -> Self {
        let max = stage.max_context_messages();
        Self {
            max_context_messages: max,
            min_recent_messages: min_recent_for(max),
            cache_ttl_secs: default_history_cache_ttl_secs(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::for_stage(ContextStage::Full)
    }
}

/// Configuration for prompt assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Token ceiling for the assembled prompt
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Include the system prompt section
    #[serde(default = "default_true")]
    pub enable_system_prompt: bool,

    /// Append the supplementary unrestricted-roleplay instruction block
    #[serde(default)]
    pub enable_jailbreak_prompt: bool,

    /// TTL for cached character / persona blocks
    #[serde(default = "default_entity_cache_ttl_secs")]
    pub entity_cache_ttl_secs: u64,
}

fn default_max_tokens() -> usize {
    4096
}
fn default_true() -> bool {
    true
}
fn default_entity_cache_ttl_secs() -> u64 {
    300
}

impl AssemblyConfig {
    pub fn entity_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.entity_cache_ttl_secs)
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            enable_system_prompt: true,
            enable_jailbreak_prompt: false,
            entity_cache_ttl_secs: default_entity_cache_ttl_secs(),
        }
    }
}
