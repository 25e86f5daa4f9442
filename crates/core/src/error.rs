//! Error types for the promptloom domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! The propagation policy is deliberately narrow: data-availability gaps
//! (missing character, missing persona, empty history) and collaborator
//! failures are absorbed locally and surfaced through return-value fields,
//! never as errors crossing the pipeline boundary. The variants below cover
//! the remaining, genuinely exceptional conditions.

use thiserror::Error;

/// The top-level error type for all promptloom operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Assembly errors ---
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    // --- History errors ---
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Programmer-misuse conditions in prompt assembly. Runtime data gaps are
/// not represented here; they degrade to reduced prompt content instead.
#[derive(Debug, Clone, Error)]
pub enum AssemblyError {
    #[error("No prompt sections registered")]
    NoSections,
}

/// Failures reported by history-ranking collaborators. These trigger the
/// selector's deterministic fallback path and are logged, not propagated.
#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    #[error("Ranking service unavailable")]
    Unavailable,

    #[error("Ranking failed: {0}")]
    RankingFailed(String),
}
