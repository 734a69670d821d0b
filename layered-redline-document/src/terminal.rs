//! Per-module collection results.

use serde::{Deserialize, Serialize};

use crate::{DroppedSuggestion, ReconcileOutcome, RedlineSuggestion};

/// How a terminal module's `original_content` was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentSource {
    /// A content field on the module's own result
    Direct { path: String },
    /// An original-document field inside the result's metadata
    Metadata { path: String },
    /// Rebuilt from an upstream document-input or paragraph-splitter node
    Upstream {
        #[serde(rename = "nodeId")]
        node_id: String,
        #[serde(rename = "moduleType")]
        module_type: String,
    },
    /// Longest prose-like string found anywhere in the result
    Heuristic { path: String },
    /// Nothing usable was found
    Unresolved,
}

impl ContentSource {
    /// False for sources that were guessed or missing.
    pub fn is_confident(&self) -> bool {
        !matches!(self, ContentSource::Heuristic { .. } | ContentSource::Unresolved)
    }
}

impl std::fmt::Display for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentSource::Direct { path } => write!(f, "direct({})", path),
            ContentSource::Metadata { path } => write!(f, "metadata({})", path),
            ContentSource::Upstream {
                node_id,
                module_type,
            } => write!(f, "upstream({} [{}])", node_id, module_type),
            ContentSource::Heuristic { path } => write!(f, "heuristic({})", path),
            ContentSource::Unresolved => f.write_str("unresolved"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalMetadata {
    pub content_source: ContentSource,
    /// Suggestions produced by the extractor, before reconciliation
    pub extracted_suggestions: usize,
    pub dropped_suggestions: Vec<DroppedSuggestion>,
    pub relocated_suggestions: usize,
}

/// Reconciled output of one terminal pipeline module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalModuleData {
    pub node_id: String,
    pub module_type: String,
    pub original_content: String,
    pub suggestions: Vec<RedlineSuggestion>,
    pub metadata: TerminalMetadata,
}

impl TerminalModuleData {
    /// Assemble from resolved content and a reconciliation pass over it.
    pub fn from_outcome(
        node_id: impl Into<String>,
        module_type: impl Into<String>,
        original_content: String,
        content_source: ContentSource,
        extracted_suggestions: usize,
        outcome: ReconcileOutcome,
    ) -> Self {
        TerminalModuleData {
            node_id: node_id.into(),
            module_type: module_type.into(),
            original_content,
            suggestions: outcome.suggestions,
            metadata: TerminalMetadata {
                content_source,
                extracted_suggestions,
                dropped_suggestions: outcome.dropped,
                relocated_suggestions: outcome.relocated,
            },
        }
    }

    pub fn has_content(&self) -> bool {
        !self.original_content.is_empty()
    }
}
