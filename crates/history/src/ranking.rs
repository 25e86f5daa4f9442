//! The memory-ranking capability.

use async_trait::async_trait;
use promptloom_core::{HistoryEntry, HistoryError, Message};

/// An external service that scores past turns for relevance to the
/// current moment of the conversation.
///
/// Injected into [`crate::HistorySelector`] as `Option<Arc<dyn
/// RankingService>>`; hosts without a ranking backend pass `None` and get
/// the deterministic fallback window.
///
/// Contract: the returned entries may be non-contiguous relevance picks,
/// but must include at least the `min_recent` most recent turns, in
/// chronological order. The selector re-checks the `max_messages` bound
/// regardless, so an over-delivering implementation cannot blow the
/// prompt budget.
#[async_trait]
pub trait RankingService: Send + Sync {
    async fn rank(
        &self,
        session_id: &str,
        messages: &[Message],
        max_messages: usize,
        min_recent: usize,
    ) -> std::result::Result<Vec<HistoryEntry>, HistoryError>;
}
