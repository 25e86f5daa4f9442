//! Token estimation utilities.
//!
//! Uses a character-class heuristic rather than a real tokenizer: ASCII
//! text averages ~4 characters per token under BPE tokenizers, while CJK
//! scripts sit close to one token per character. The weights below are an
//! empirical budget heuristic, not a tokenizer match — swapping in a real
//! BPE count would change budget behavior but not any caller contract.
//!
//! Weights per character: ASCII/punctuation 0.25, CJK 0.85, whitespace 0.5,
//! everything else 1.0. Summed and rounded up. Single O(n) pass.

use promptloom_core::HistoryEntry;

/// Per-entry overhead for role name and wire-format delimiters.
const ENTRY_OVERHEAD: usize = 4;

/// Estimate the token count for a string.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }

    let mut sum = 0.0f64;
    for ch in text.chars() {
        sum += char_weight(ch);
    }
    sum.ceil() as usize
}

pub(crate) fn char_weight(ch: char) -> f64 {
    if ch.is_whitespace() {
        0.5
    } else if ch.is_ascii() {
        0.25
    } else if is_cjk(ch) {
        0.85
    } else {
        1.0
    }
}

/// Hiragana, Katakana, and CJK Unified Ideographs.
fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{3040}'..='\u{309F}' // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
    )
}

/// Estimate tokens for a history entry including per-message overhead.
pub fn estimate_entry_tokens(entry: &HistoryEntry) -> usize {
    ENTRY_OVERHEAD + estimate_tokens(&entry.content)
}

/// Estimate tokens for a slice of history entries.
pub fn estimate_entries_tokens(entries: &[HistoryEntry]) -> usize {
    entries.iter().map(estimate_entry_tokens).sum()
}
