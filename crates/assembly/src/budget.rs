//! Token budget enforcement.
//!
//! Trims prompt text down toward a token ceiling, eating the most
//! expendable registered sections first. Enforcement is best-effort by
//! contract: when every reducible section is spent and the text still
//! exceeds the budget, the result is returned as-is and the caller reads
//! `final_tokens` — budget overage is never an error.

use crate::token::{char_weight, estimate_tokens};

/// Marker appended when content is cut mid-section.
const TRUNCATION_MARKER: &str = "\n[truncated]";

/// A named stretch of the prompt that may be elided or shortened.
///
/// `priority` is expendability, not importance: higher values are trimmed
/// first.
#[derive(Debug, Clone)]
pub struct ReducibleSection {
    pub name: String,
    pub content: String,
    pub priority: u8,
}

/// The outcome of a [`limit`] call.
#[derive(Debug, Clone)]
pub struct LimitOutcome {
    pub limited_text: String,
    pub was_limited: bool,
    pub original_tokens: usize,
    pub final_tokens: usize,
}

/// Enforce `max_tokens` over `text`.
///
/// Without reducible sections the text is hard-truncated: an initial cut
/// at `floor(max_tokens × 3.5)` characters (the inverse of the average
/// estimator weighting), then trailing characters dropped until the
/// result, marker included, fits the budget. Token-dense text under-cuts
/// on the character count alone, so the weight walk is what guarantees
/// the bound. The marker is omitted when even it alone would not fit.
/// With sections, the most expendable section is elided outright when its
/// whole cost fits inside the excess, or shortened proportionally to the
/// excess it must absorb, stopping as soon as the estimate fits.
pub fn limit(text: &str, max_tokens: usize, reducible: &[ReducibleSection]) -> LimitOutcome {
    let original_tokens = estimate_tokens(text);
    if original_tokens <= max_tokens {
        return LimitOutcome {
            limited_text: text.to_string(),
            was_limited: false,
            original_tokens,
            final_tokens: original_tokens,
        };
    }

    let limited_text = if reducible.is_empty() {
        hard_truncate(text, max_tokens)
    } else {
        reduce_sections(text, max_tokens, reducible)
    };

    let final_tokens = estimate_tokens(&limited_text);
    LimitOutcome {
        limited_text,
        was_limited: true,
        original_tokens,
        final_tokens,
    }
}

fn hard_truncate(text: &str, max_tokens: usize) -> String {
    let keep_chars = (max_tokens as f64 * 3.5).floor() as usize;
    let mut kept: Vec<char> = text.chars().take(keep_chars).collect();
    let mut kept_weight: f64 = kept.iter().copied().map(char_weight).sum();
    let marker_weight: f64 = TRUNCATION_MARKER.chars().map(char_weight).sum();

    // The character cut assumes average-weight text; dense scripts need
    // further trimming to honor the token bound.
    while !kept.is_empty() && (kept_weight + marker_weight).ceil() as usize > max_tokens {
        if let Some(ch) = kept.pop() {
            kept_weight -= char_weight(ch);
        }
    }

    let mut out: String = kept.into_iter().collect();
    if (kept_weight + marker_weight).ceil() as usize <= max_tokens {
        out.push_str(TRUNCATION_MARKER);
    }
    out
}

fn reduce_sections(text: &str, max_tokens: usize, reducible: &[ReducibleSection]) -> String {
    // Most expendable first; stable for equal priorities.
    let mut ordered: Vec<&ReducibleSection> = reducible.iter().collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut current = text.to_string();
    for section in ordered {
        let running = estimate_tokens(&current);
        if running <= max_tokens {
            break;
        }
        let excess = running - max_tokens;

        if section.content.is_empty() || !current.contains(&section.content) {
            continue;
        }

        let section_tokens = estimate_tokens(&section.content);
        let replacement = if section_tokens <= excess {
            elision_marker(&section.name)
        } else {
            shorten(&section.content, section_tokens, excess)
        };

        // Never swap a section for a longer marker.
        if replacement.len() >= section.content.len() {
            continue;
        }
        current = current.replacen(&section.content, &replacement, 1);
    }

    current
}

/// Cut enough of `content` to absorb `excess` tokens, marker included.
fn shorten(content: &str, section_tokens: usize, excess: usize) -> String {
    let marker_tokens = estimate_tokens(TRUNCATION_MARKER);
    let keep_tokens = section_tokens.saturating_sub(excess + marker_tokens);
    let keep_fraction = keep_tokens as f64 / section_tokens as f64;
    let total_chars = content.chars().count();
    let keep_chars = (total_chars as f64 * keep_fraction).floor() as usize;

    let mut out: String = content.chars().take(keep_chars).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

fn elision_marker(name: &str) -> String {
    format!("[{name} omitted]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, content: &str, priority: u8) -> ReducibleSection {
        ReducibleSection {
            name: name.into(),
            content: content.into(),
            priority,
        }
    }

    #[test]
    fn under_budget_returns_unchanged() {
        let outcome = limit("short text", 100, &[]);
        assert!(!outcome.was_limited);
        assert_eq!(outcome.limited_text, "short text");
        assert_eq!(outcome.original_tokens, outcome.final_tokens);
    }

    #[test]
    fn hard_truncation_without_sections() {
        let text = "a".repeat(1000); // 250 tokens
        let outcome = limit(&text, 10, &[]);
        assert!(outcome.was_limited);
        assert!(outcome.limited_text.starts_with("aaa"));
        assert!(outcome.limited_text.ends_with(TRUNCATION_MARKER));
        // 27 × 0.25 + the marker's 3.25 lands exactly on the bound
        assert_eq!(outcome.limited_text.len(), 27 + TRUNCATION_MARKER.len());
        assert_eq!(outcome.final_tokens, 10);
    }

    #[test]
    fn hard_truncation_bounds_token_dense_text() {
        // 200 CJK chars = 170 tokens; a char-count cut alone would keep
        // everything and the marker would push the estimate up
        let text = "日".repeat(200);
        let outcome = limit(&text, 100, &[]);
        assert!(outcome.was_limited);
        assert!(outcome.final_tokens <= 100);
        assert!(outcome.final_tokens <= outcome.original_tokens);
        assert!(outcome.limited_text.ends_with(TRUNCATION_MARKER));
        // 113 × 0.85 + 3.25 → ceil = 100
        assert_eq!(outcome.limited_text.chars().count(), 113 + TRUNCATION_MARKER.len());
    }

    #[test]
    fn marker_skipped_when_it_cannot_fit() {
        // "hello" is 2 tokens; at max 1 even the marker alone (4 tokens)
        // would overshoot, so everything goes
        let outcome = limit("hello", 1, &[]);
        assert!(outcome.was_limited);
        assert_eq!(outcome.limited_text, "");
        assert_eq!(outcome.final_tokens, 0);
    }

    #[test]
    fn most_expendable_section_goes_first() {
        let persona_block = "p".repeat(800); // 200 tokens
        let character_block = "c".repeat(400); // 100 tokens
        let text = format!("header {character_block} middle {persona_block} tail");

        let sections = vec![
            section("character_information", &character_block, 1),
            section("persona_information", &persona_block, 2),
        ];

        let outcome = limit(&text, 100, &sections);
        assert!(outcome.was_limited);
        // The persona block is fully elided, the character block only
        // shortened.
        assert!(!outcome.limited_text.contains(&persona_block));
        assert!(outcome.limited_text.contains("[persona_information omitted]"));
        assert!(outcome.limited_text.contains("ccc"));
        assert!(outcome.final_tokens <= 100);
    }

    #[test]
    fn partial_truncation_when_section_exceeds_excess() {
        let block = "x".repeat(800); // 200 tokens
        let text = format!("head {block} tail");
        let sections = vec![section("block", &block, 1)];

        let outcome = limit(&text, 150, &sections);
        assert!(outcome.was_limited);
        assert!(outcome.limited_text.contains("xxx"));
        assert!(outcome.limited_text.contains(TRUNCATION_MARKER));
        assert!(outcome.final_tokens <= 150);
    }

    #[test]
    fn best_effort_when_sections_insufficient() {
        let block = "b".repeat(40);
        let filler = "f".repeat(2000); // not reducible
        let text = format!("{filler} {block}");
        let sections = vec![section("block", &block, 1)];

        let outcome = limit(&text, 10, &sections);
        // Still over budget, reported through final_tokens rather than
        // raised.
        assert!(outcome.was_limited);
        assert!(outcome.final_tokens > 10);
        assert!(outcome.final_tokens <= outcome.original_tokens);
    }

    #[test]
    fn enforcement_never_increases_tokens() {
        let prose = "a longer sentence with some variety in it ".repeat(20);
        let cjk = "長い日本語のテキスト。".repeat(50); // 475 tokens, 550 chars
        let texts = ["tiny", "hello", prose.as_str(), cjk.as_str()];
        for text in texts {
            // Sweep through the dense-text zone where the char-count cut
            // keeps everything (for the CJK sample, max ∈ 158..475)
            for max in (1usize..=500).step_by(7).chain([1000]) {
                let original = estimate_tokens(text);
                let outcome = limit(text, max, &[]);
                assert!(
                    outcome.final_tokens <= original,
                    "{} > {} at max {max}",
                    outcome.final_tokens,
                    original
                );
                assert!(outcome.final_tokens <= max.max(original));
                if outcome.was_limited {
                    assert!(outcome.final_tokens <= max);
                }
            }
        }
    }

    #[test]
    fn stops_once_budget_met() {
        let first = "1".repeat(400); // 100 tokens
        let second = "2".repeat(400); // 100 tokens
        let text = format!("{first} {second} rest");
        let sections = vec![
            section("first", &first, 2),
            section("second", &second, 1),
        ];

        let outcome = limit(&text, 110, &sections);
        // Shortening the more expendable block suffices; the other
        // survives untouched.
        assert!(!outcome.limited_text.contains(&first));
        assert!(outcome.limited_text.contains(&second));
        assert!(outcome.final_tokens <= 110);
    }

    #[test]
    fn missing_section_content_is_skipped() {
        let text = "t".repeat(400);
        let sections = vec![section("ghost", "not actually present", 5)];
        let outcome = limit(&text, 10, &sections);
        // Nothing matched, so nothing changed.
        assert_eq!(outcome.limited_text, text);
        assert!(outcome.was_limited);
    }
}
