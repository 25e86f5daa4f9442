//! Version-keyed cache for rendered prompt sections.
//!
//! Keys are `"{entity_id}_{updated_at_millis}"`, so editing an entity
//! changes the key and stale text simply stops being looked up. TTL
//! expiry exists only to bound memory growth from abandoned keys.
//!
//! The cache is a latency optimization. Assembly output never depends on
//! cache state; a cleared cache yields byte-identical prompts.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

struct CacheEntry {
    text: String,
    stored_at: Instant,
}

/// A TTL-bounded, version-keyed text cache.
///
/// Interior mutability via `Mutex`. The lock is held across the builder
/// call in [`PromptCache::get_or_build`]; builders are cheap pure renders.
pub struct PromptCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl PromptCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Fetch the text under `version_key`, rendering and storing it on a
    /// miss or on an expired entry.
    pub fn get_or_build(&self, version_key: &str, build: impl FnOnce() -> String) -> String {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            // A poisoned lock only means another thread panicked mid-insert;
            // the map itself is still a valid cache.
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(entry) = entries.get(version_key) {
            if entry.stored_at.elapsed() < self.ttl {
                debug!(key = version_key, "prompt cache hit");
                return entry.text.clone();
            }
        }

        debug!(key = version_key, "prompt cache miss");
        let text = build();
        entries.insert(
            version_key.to_string(),
            CacheEntry {
                text: text.clone(),
                stored_at: Instant::now(),
            },
        );
        text
    }

    /// Drop every cached version of one entity, regardless of timestamp.
    pub fn invalidate(&self, entity_id: &str) {
        let prefix = format!("{entity_id}_");
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.retain(|key, _| !key.starts_with(&prefix));
    }

    /// Drop everything.
    pub fn clear(&self) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for PromptCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
