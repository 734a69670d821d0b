use chrono::{DateTime, Utc};
use layered_redline::{apply_markup_to_content_or_original, OverlayDisplay, PositionMap};
use serde::{Deserialize, Serialize};

use crate::{DroppedSuggestion, RedlineSuggestion, SuggestionStatus};

/// Facts about the uploaded file, supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSource {
    pub file_name: String,
    pub file_type: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    /// Source HTML, when the document was uploaded as HTML
    #[serde(default)]
    pub html: Option<String>,
}

impl DocumentSource {
    pub fn new(file_name: impl Into<String>, file_type: impl Into<String>) -> Self {
        DocumentSource {
            file_name: file_name.into(),
            file_type: file_type.into(),
            last_modified: None,
            html: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedlineMetadata {
    pub file_name: String,
    pub file_type: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub total_suggestions: usize,
    pub accepted_suggestions: usize,
    pub rejected_suggestions: usize,
    /// Module types that contributed suggestions, in pipeline order
    pub source_modules: Vec<String>,
    /// Modules whose own content differed from `original_content`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rebased_modules: Vec<RebasedModule>,
}

/// A module whose suggestions were re-validated against the document content
/// because its own content was a different text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebasedModule {
    pub node_id: String,
    pub relocated: usize,
    pub dropped: Vec<DroppedSuggestion>,
}

/// An immutable snapshot of a reviewed document.
///
/// `original_content` never changes. `current_content` starts equal to it
/// and is only recomputed by review actions, each of which yields a new
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedlineDocument {
    pub id: String,
    pub original_content: String,
    pub current_content: String,
    pub suggestions: Vec<RedlineSuggestion>,
    pub metadata: RedlineMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_map: Option<PositionMap>,
}

impl RedlineDocument {
    pub fn suggestion(&self, id: &str) -> Option<&RedlineSuggestion> {
        self.suggestions.iter().find(|s| s.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &RedlineSuggestion> {
        self.suggestions.iter().filter(|s| s.is_pending())
    }

    pub fn with_status(&self, status: SuggestionStatus) -> impl Iterator<Item = &RedlineSuggestion> {
        self.suggestions.iter().filter(move |s| s.status == status)
    }

    /// Recompute the status counters from the suggestion list.
    pub(crate) fn refresh_counts(&mut self) {
        self.metadata.total_suggestions = self.suggestions.len();
        self.metadata.accepted_suggestions = self.with_status(SuggestionStatus::Accepted).count();
        self.metadata.rejected_suggestions = self.with_status(SuggestionStatus::Rejected).count();
    }

    /// Source HTML with pending suggestions wrapped in markup.
    ///
    /// Suggestion offsets refer to `original_content` and are carried into
    /// the HTML's text projection, which lacks the paragraph separators.
    /// Falls back to the unmodified HTML if it cannot be segmented.
    pub fn render_html(&self, html: &str) -> String {
        let pending: Vec<&RedlineSuggestion> = self.pending().collect();
        apply_markup_to_content_or_original(html, &self.original_content, &pending)
    }

    /// Text rendering of every suggestion under the original content.
    pub fn display(&self) -> OverlayDisplay<'_> {
        OverlayDisplay::new(&self.original_content).with(&self.suggestions)
    }
}
