//! Conversation history selection.
//!
//! Decides which past turns accompany the live input into the prompt.
//! Two paths:
//!
//! - **Ranked**: an injected [`RankingService`] picks relevance-ordered
//!   turns (possibly non-contiguous), always including the most recent
//!   ones.
//! - **Fallback**: a deterministic recency window — last N non-deleted
//!   user/assistant turns, deduped, then halved as a safety margin.
//!
//! Ranking failures never propagate; the selector logs and falls back.
//! Results are memoized per session for a few seconds.

pub mod ranking;
pub mod selector;

pub use ranking::RankingService;
pub use selector::HistorySelector;
