//! Suggestion records shared by extractors, the reconciler and the UI.

use layered_redline::{Overlay, TextSpan};
use serde::{Deserialize, Serialize};

/// Category of a suggested edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Grammar,
    Style,
    Legal,
    Clarity,
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionType::Grammar => "grammar",
            SuggestionType::Style => "style",
            SuggestionType::Legal => "legal",
            SuggestionType::Clarity => "clarity",
        }
    }
}

impl std::fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Review state. `Pending` is the only state with outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// Where a suggestion's offsets came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    /// A `position`/`location` object on the upstream item
    #[default]
    Explicit,
    /// Flat `startPos`/`endPos` (or `start`/`end`) fields
    Flat,
    /// No offsets upstream; `0..len(originalText)` was assumed
    Fallback,
    /// Offsets were rewritten by the reconciler
    Relocated,
}

/// A single proposed edit against a document's original content.
///
/// `start_pos`/`end_pos` are char offsets. They are signed because they are
/// copied verbatim from upstream output; only suggestions that survive
/// reconciliation are guaranteed to satisfy
/// `original_content[start_pos..end_pos] == original_text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedlineSuggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,
    pub severity: Severity,
    pub original_text: String,
    pub suggested_text: String,
    #[serde(default)]
    pub explanation: String,
    pub start_pos: i64,
    pub end_pos: i64,
    pub paragraph_id: String,
    #[serde(default)]
    pub status: SuggestionStatus,
    pub confidence: f64,
    #[serde(default)]
    pub source_module: String,
    #[serde(default)]
    pub position_source: PositionSource,
}

impl RedlineSuggestion {
    /// A pending suggestion with the given claimed offsets.
    pub fn new(
        id: impl Into<String>,
        suggestion_type: SuggestionType,
        original_text: impl Into<String>,
        suggested_text: impl Into<String>,
        start_pos: i64,
        end_pos: i64,
    ) -> Self {
        RedlineSuggestion {
            id: id.into(),
            suggestion_type,
            severity: Severity::Medium,
            original_text: original_text.into(),
            suggested_text: suggested_text.into(),
            explanation: String::new(),
            start_pos,
            end_pos,
            paragraph_id: String::new(),
            status: SuggestionStatus::Pending,
            confidence: 1.0,
            source_module: String::new(),
            position_source: PositionSource::Explicit,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_paragraph_id(mut self, paragraph_id: impl Into<String>) -> Self {
        self.paragraph_id = paragraph_id.into();
        self
    }

    /// Clamped to `0.0..=1.0`; NaN becomes 0.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_source_module(mut self, source_module: impl Into<String>) -> Self {
        self.source_module = source_module.into();
        self
    }

    pub fn with_position_source(mut self, position_source: PositionSource) -> Self {
        self.position_source = position_source;
        self
    }

    /// The claimed span, if it is non-negative and not inverted.
    pub fn span(&self) -> Option<TextSpan> {
        TextSpan::from_claimed(self.start_pos, self.end_pos)
    }

    pub fn is_pending(&self) -> bool {
        self.status == SuggestionStatus::Pending
    }
}

impl Overlay for RedlineSuggestion {
    fn overlay_id(&self) -> &str {
        &self.id
    }

    fn overlay_span(&self) -> Option<TextSpan> {
        self.span()
    }

    fn original_text(&self) -> &str {
        &self.original_text
    }

    fn replacement_text(&self) -> &str {
        &self.suggested_text
    }

    fn overlay_kind(&self) -> &str {
        self.suggestion_type.as_str()
    }
}
