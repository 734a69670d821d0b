//! Accept/reject review actions.
//!
//! Each action consumes a snapshot by reference and returns a new one. The
//! original content is never touched; `current_content` is rebuilt from it
//! by applying every accepted suggestion in position order.

use layered_redline::{TextIndex, TextSpan};
use serde::{Deserialize, Serialize};

use crate::{RedlineDocument, RedlineSuggestion, SuggestionStatus};

/// A reviewer decision on a single suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "suggestionId", rename_all = "camelCase")]
pub enum ReviewAction {
    Accept(String),
    Reject(String),
}

impl ReviewAction {
    pub fn suggestion_id(&self) -> &str {
        match self {
            ReviewAction::Accept(id) | ReviewAction::Reject(id) => id,
        }
    }

    fn target_status(&self) -> SuggestionStatus {
        match self {
            ReviewAction::Accept(_) => SuggestionStatus::Accepted,
            ReviewAction::Reject(_) => SuggestionStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("no redline document to review")]
    NoDocument,

    #[error("no suggestion with id {0:?}")]
    UnknownSuggestion(String),

    #[error("suggestion {id:?} was already {status:?}")]
    AlreadyReviewed {
        id: String,
        status: SuggestionStatus,
    },

    #[error("suggestion {id:?} overlaps accepted suggestion {other:?}")]
    Overlap { id: String, other: String },

    #[error("suggestion {0:?} does not fit the original content")]
    InvalidSpan(String),
}

/// Apply `action`, producing the next snapshot.
///
/// Only pending suggestions can change state. Accepting a suggestion whose
/// span overlaps one that is already accepted is refused.
pub fn apply_review_action(
    document: &RedlineDocument,
    action: &ReviewAction,
) -> Result<RedlineDocument, ReviewError> {
    let id = action.suggestion_id();
    let target_idx = document
        .suggestions
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| ReviewError::UnknownSuggestion(id.to_string()))?;
    let target = &document.suggestions[target_idx];

    if !target.is_pending() {
        return Err(ReviewError::AlreadyReviewed {
            id: id.to_string(),
            status: target.status,
        });
    }

    if let ReviewAction::Accept(_) = action {
        let span = target
            .span()
            .ok_or_else(|| ReviewError::InvalidSpan(id.to_string()))?;
        if let Some(other) = document
            .with_status(SuggestionStatus::Accepted)
            .find(|other| other.span().map_or(false, |s| s.overlaps(&span)))
        {
            return Err(ReviewError::Overlap {
                id: id.to_string(),
                other: other.id.clone(),
            });
        }
    }

    let mut next = document.clone();
    next.suggestions[target_idx].status = action.target_status();
    next.current_content = accepted_content(&next.original_content, &next.suggestions)?;
    next.refresh_counts();

    tracing::debug!(
        id,
        status = ?next.suggestions[target_idx].status,
        accepted = next.metadata.accepted_suggestions,
        rejected = next.metadata.rejected_suggestions,
        "review action applied"
    );

    Ok(next)
}

/// `original` with every accepted suggestion's replacement spliced in.
fn accepted_content(original: &str, suggestions: &[RedlineSuggestion]) -> Result<String, ReviewError> {
    let index = TextIndex::new(original);
    let mut accepted: Vec<(TextSpan, &RedlineSuggestion)> = Vec::new();
    for suggestion in suggestions.iter().filter(|s| s.status == SuggestionStatus::Accepted) {
        let span = suggestion
            .span()
            .filter(|span| span.end <= index.len_chars())
            .ok_or_else(|| ReviewError::InvalidSpan(suggestion.id.clone()))?;
        accepted.push((span, suggestion));
    }
    accepted.sort_by_key(|(span, _)| *span);

    let mut content = String::with_capacity(original.len());
    let mut cursor = 0usize;
    for (span, suggestion) in accepted {
        let before = index
            .slice(TextSpan::new(cursor, span.start))
            .ok_or_else(|| ReviewError::InvalidSpan(suggestion.id.clone()))?;
        content.push_str(before);
        content.push_str(&suggestion.suggested_text);
        cursor = span.end;
    }
    let rest = index
        .slice(TextSpan::new(cursor, index.len_chars()))
        .unwrap_or_default();
    content.push_str(rest);

    Ok(content)
}
