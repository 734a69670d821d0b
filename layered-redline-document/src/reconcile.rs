//! Reconciling claimed offsets against the actual document text.
//!
//! Upstream modules report positions that are frequently off by a few
//! characters (anchors counted, whitespace normalized differently) or
//! wrong outright. Every suggestion passes through [`reconcile`] before it
//! can reach a [`RedlineDocument`](crate::RedlineDocument):
//!
//! 1. spans that cannot be placed at all are dropped,
//! 2. spans whose text already matches are kept as-is,
//! 3. anything else is searched for within a bounded window around the
//!    claim and either relocated or dropped.

use layered_redline::{TextIndex, TextSpan};
use serde::{Deserialize, Serialize};

use crate::{PositionSource, RedlineSuggestion};

/// Default number of chars searched on each side of a mismatched claim.
pub const DEFAULT_SEARCH_RADIUS: usize = 50;

/// Why a suggestion was removed during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropReason {
    /// Negative start, inverted or empty span, or start past the end of the content
    OutOfBounds,
    /// Nothing to locate
    EmptyOriginalText,
    /// Claimed text does not occur within the search window
    NotFoundInWindow,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::OutOfBounds => f.write_str("span is out of bounds"),
            DropReason::EmptyOriginalText => f.write_str("original text is empty"),
            DropReason::NotFoundInWindow => f.write_str("original text not found near claimed span"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedSuggestion {
    pub id: String,
    pub reason: DropReason,
}

/// Survivors plus an account of everything that was not kept verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Suggestions satisfying `content[start_pos..end_pos] == original_text`, in input order
    pub suggestions: Vec<RedlineSuggestion>,
    pub dropped: Vec<DroppedSuggestion>,
    /// Number of survivors whose offsets were rewritten
    pub relocated: usize,
}

/// Validate every suggestion against `content`, relocating within `radius`.
///
/// Never fails: unusable suggestions are recorded in
/// [`ReconcileOutcome::dropped`]. When several occurrences sit inside the
/// window, the one whose start is closest to the claimed start wins (the
/// earlier one on a tie).
pub fn reconcile(
    content: &str,
    suggestions: Vec<RedlineSuggestion>,
    radius: usize,
) -> ReconcileOutcome {
    let index = TextIndex::new(content);
    let mut outcome = ReconcileOutcome::default();

    for mut suggestion in suggestions {
        match place(&index, &suggestion, radius) {
            Placement::Exact => outcome.suggestions.push(suggestion),
            Placement::Relocated(span) => {
                tracing::debug!(
                    id = %suggestion.id,
                    claimed_start = suggestion.start_pos,
                    claimed_end = suggestion.end_pos,
                    to = %span,
                    "relocated suggestion"
                );
                suggestion.start_pos = span.start as i64;
                suggestion.end_pos = span.end as i64;
                suggestion.position_source = PositionSource::Relocated;
                outcome.relocated += 1;
                outcome.suggestions.push(suggestion);
            }
            Placement::Dropped(reason) => {
                tracing::debug!(
                    id = %suggestion.id,
                    start = suggestion.start_pos,
                    end = suggestion.end_pos,
                    %reason,
                    "dropped suggestion"
                );
                outcome.dropped.push(DroppedSuggestion {
                    id: suggestion.id,
                    reason,
                });
            }
        }
    }

    outcome
}

/// True if `suggestion` can be painted onto `content` as-is.
pub fn is_valid_position(content: &str, suggestion: &RedlineSuggestion) -> bool {
    let index = TextIndex::new(content);
    matches!(place(&index, suggestion, 0), Placement::Exact)
}

enum Placement {
    Exact,
    Relocated(TextSpan),
    Dropped(DropReason),
}

fn place(index: &TextIndex<'_>, suggestion: &RedlineSuggestion, radius: usize) -> Placement {
    if suggestion.original_text.is_empty() {
        return Placement::Dropped(DropReason::EmptyOriginalText);
    }

    let content_len = index.len_chars();
    let claimed = match suggestion.span() {
        Some(span) if !span.is_empty() && span.start < content_len => span,
        _ => return Placement::Dropped(DropReason::OutOfBounds),
    };

    if index.slice(claimed) == Some(suggestion.original_text.as_str()) {
        return Placement::Exact;
    }

    let window = claimed.expand(radius, content_len);
    index
        .find_within(&suggestion.original_text, window)
        .into_iter()
        .min_by_key(|found| found.start_distance(&claimed))
        .map(Placement::Relocated)
        .unwrap_or(Placement::Dropped(DropReason::NotFoundInWindow))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SuggestionType;
    use proptest::prelude::*;

    const CONTENT: &str = "Hello world.\n\nThis is bad grammer.";

    fn grammar(id: &str, original: &str, start: i64, end: i64) -> RedlineSuggestion {
        RedlineSuggestion::new(id, SuggestionType::Grammar, original, "x", start, end)
    }

    #[test]
    fn exact_claims_pass_through() {
        let outcome = reconcile(CONTENT, vec![grammar("s", "grammer", 26, 33)], DEFAULT_SEARCH_RADIUS);
        assert_eq!(outcome.suggestions.len(), 1);
        assert_eq!(outcome.relocated, 0);
        assert_eq!(outcome.suggestions[0].position_source, PositionSource::Explicit);
    }

    #[test]
    fn overrunning_claim_is_relocated() {
        // Claimed 33..40 overruns the 34-char content
        let outcome = reconcile(CONTENT, vec![grammar("s", "grammer", 33, 40)], DEFAULT_SEARCH_RADIUS);
        let survivor = &outcome.suggestions[0];
        assert_eq!((survivor.start_pos, survivor.end_pos), (26, 33));
        assert_eq!(survivor.position_source, PositionSource::Relocated);
        assert_eq!(outcome.relocated, 1);
    }

    #[test]
    fn unplaceable_claims_are_dropped() {
        let outcome = reconcile(
            CONTENT,
            vec![
                grammar("negative", "Hello", -1, 4),
                grammar("inverted", "Hello", 5, 2),
                grammar("past-end", "grammer", 34, 41),
                grammar("empty", "", 0, 0),
                grammar("absent", "missing", 0, 7),
                // Would wrap onto "worl" at 6..10 if truncated to 32 bits
                grammar("oversized", "worl", (1 << 32) + 6, (1 << 32) + 10),
            ],
            DEFAULT_SEARCH_RADIUS,
        );
        assert!(outcome.suggestions.is_empty());
        let reasons: Vec<(&str, DropReason)> = outcome
            .dropped
            .iter()
            .map(|d| (d.id.as_str(), d.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("negative", DropReason::OutOfBounds),
                ("inverted", DropReason::OutOfBounds),
                ("past-end", DropReason::OutOfBounds),
                ("empty", DropReason::EmptyOriginalText),
                ("absent", DropReason::NotFoundInWindow),
                ("oversized", DropReason::OutOfBounds),
            ]
        );
    }

    #[test]
    fn closest_occurrence_wins() {
        let content = "the fee, the fee, the fee";
        // Occurrences at 0, 9 and 18; claim near the last one
        let outcome = reconcile(content, vec![grammar("s", "the fee", 16, 23)], DEFAULT_SEARCH_RADIUS);
        assert_eq!(outcome.suggestions[0].start_pos, 18);
    }

    #[test]
    fn search_window_is_bounded() {
        let padding = "x".repeat(120);
        let content = format!("target{}", padding);
        let outcome = reconcile(&content, vec![grammar("far", "target", 100, 106)], DEFAULT_SEARCH_RADIUS);
        assert_eq!(outcome.dropped[0].reason, DropReason::NotFoundInWindow);

        let outcome = reconcile(&content, vec![grammar("far", "target", 100, 106)], 100);
        assert_eq!(outcome.suggestions[0].start_pos, 0);
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let content = "Under § 1983 the «Tenant» shall pay.";
        let outcome = reconcile(content, vec![grammar("s", "Tenant", 16, 22)], DEFAULT_SEARCH_RADIUS);
        let survivor = &outcome.suggestions[0];
        assert_eq!((survivor.start_pos, survivor.end_pos), (18, 24));
        assert!(is_valid_position(content, survivor));
    }

    proptest! {
        #[test]
        fn survivors_match_content(
            words in proptest::collection::vec("[a-z§é]{1,8}", 1..20),
            claims in proptest::collection::vec((0usize..20, -5i64..200, 0i64..12), 0..12),
        ) {
            let content = words.join(" ");
            let suggestions: Vec<RedlineSuggestion> = claims
                .iter()
                .enumerate()
                .map(|(i, (word_idx, start, len))| {
                    let original = words[word_idx % words.len()].clone();
                    grammar(&format!("s{}", i), &original, *start, start + len)
                })
                .collect();
            let total = suggestions.len();

            let outcome = reconcile(&content, suggestions, DEFAULT_SEARCH_RADIUS);
            let index = TextIndex::new(&content);
            for survivor in &outcome.suggestions {
                let span = survivor.span().unwrap();
                prop_assert_eq!(index.slice(span), Some(survivor.original_text.as_str()));
            }
            prop_assert_eq!(outcome.suggestions.len() + outcome.dropped.len(), total);
        }

        #[test]
        fn small_shifts_are_recovered(shift in -10i64..=10) {
            let content = "Preamble text here. The Tenant shall pay the rent monthly.";
            // "rent" sits at 45..49
            let start = (45 + shift).max(0);
            let outcome = reconcile(content, vec![grammar("s", "rent", start, start + 4)], DEFAULT_SEARCH_RADIUS);
            prop_assert_eq!(outcome.suggestions.len(), 1);
            prop_assert_eq!(outcome.suggestions[0].start_pos, 45);
        }
    }
}
