//! History window selection.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use promptloom_core::{HistoryConfig, HistoryEntry, Message};
use tracing::{debug, warn};

use crate::ranking::RankingService;

struct MemoEntry {
    entries: Vec<HistoryEntry>,
    stored_at: Instant,
}

/// Selects the history window for a session.
///
/// With a [`RankingService`] the window is relevance-picked; without one
/// (or when ranking fails) a deterministic recency fallback applies. The
/// output is always chronological and never exceeds
/// `max_context_messages`.
///
/// Selection results are memoized per session for a short TTL; callers
/// must [`invalidate`](HistorySelector::invalidate) on message appends.
pub struct HistorySelector {
    config: HistoryConfig,
    ranking: Option<Arc<dyn RankingService>>,
    memo: Mutex<HashMap<String, MemoEntry>>,
}

impl HistorySelector {
    pub fn new(config: HistoryConfig, ranking: Option<Arc<dyn RankingService>>) -> Self {
        Self {
            config,
            ranking,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Pick the history entries to accompany the live input.
    ///
    /// Infallible: a ranking error is logged and absorbed by the
    /// fallback, never surfaced to the caller.
    pub async fn select(&self, session_id: &str, messages: &[Message]) -> Vec<HistoryEntry> {
        if let Some(entries) = self.memo_get(session_id) {
            debug!(session_id, "history memo hit");
            return entries;
        }

        let max = self.config.max_context_messages;
        let entries = match &self.ranking {
            Some(service) => {
                let ranked = service
                    .rank(session_id, messages, max, self.config.min_recent_messages)
                    .await;
                match ranked {
                    Ok(mut entries) => {
                        // An over-delivering service is clamped, keeping
                        // the most recent entries.
                        if entries.len() > max {
                            entries.drain(..entries.len() - max);
                        }
                        entries
                    }
                    Err(error) => {
                        warn!(session_id, %error, "ranking failed; using fallback window");
                        self.fallback(messages)
                    }
                }
            }
            None => self.fallback(messages),
        };

        self.memo_put(session_id, entries.clone());
        entries
    }

    /// The deterministic recency window: last `max_context_messages`
    /// non-deleted turns, user/assistant only, exact `(role, content)`
    /// duplicates removed (first occurrence wins), then halved keeping
    /// the most recent as a safety margin.
    fn fallback(&self, messages: &[Message]) -> Vec<HistoryEntry> {
        let max = self.config.max_context_messages;

        let mut recent: Vec<&Message> = messages
            .iter()
            .rev()
            .filter(|m| !m.is_deleted)
            .take(max)
            .collect();
        recent.reverse();

        let mut seen: HashSet<(promptloom_core::HistoryRole, &str)> = HashSet::new();
        let mut entries: Vec<HistoryEntry> = Vec::with_capacity(recent.len());
        for message in recent {
            let Some(entry) = HistoryEntry::from_message(message) else {
                continue;
            };
            if seen.insert((entry.role, message.content.as_str())) {
                entries.push(entry);
            }
        }

        let bound = max / 2;
        if entries.len() > bound {
            entries.drain(..entries.len() - bound);
        }
        entries
    }

    /// Forget the memoized window for a session. Call after appending,
    /// editing, or deleting a message.
    pub fn invalidate(&self, session_id: &str) {
        let mut memo = match self.memo.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        memo.remove(session_id);
    }

    fn memo_get(&self, session_id: &str) -> Option<Vec<HistoryEntry>> {
        let memo = match self.memo.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = memo.get(session_id)?;
        if entry.stored_at.elapsed() < self.config.cache_ttl() {
            Some(entry.entries.clone())
        } else {
            None
        }
    }

    fn memo_put(&self, session_id: &str, entries: Vec<HistoryEntry>) {
        let mut memo = match self.memo.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        memo.insert(
            session_id.to_string(),
            MemoEntry {
                entries,
                stored_at: Instant::now(),
            },
        );
    }
}

impl std::fmt::Debug for HistorySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistorySelector")
            .field("config", &self.config)
            .field("has_ranking", &self.ranking.is_some())
            .finish_non_exhaustive()
    }
}
