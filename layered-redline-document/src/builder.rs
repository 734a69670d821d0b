//! Merging per-module results into one renderable document.

use layered_redline::PositionMap;
use serde::Serialize;

use crate::{reconcile, DocumentSource, RebasedModule, RedlineDocument, RedlineMetadata, TerminalModuleData};

/// Why no document could be built.
///
/// This is an expected outcome ("nothing to review yet"), not a crash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum EmptyRedline {
    #[error("no terminal modules to reconcile")]
    NoTerminalModules,
    #[error("no original content could be resolved from {modules} terminal module(s)")]
    NoContent { modules: usize },
    #[error("no suggestions survived reconciliation across {modules} terminal module(s)")]
    NoSuggestions { modules: usize },
}

impl EmptyRedline {
    /// Human-readable explanation for the UI.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Aggregate terminal module results into a [`RedlineDocument`].
///
/// The first non-empty `original_content` wins; suggestions from every
/// module are concatenated in module order without deduplication. A module
/// whose content is a different text has its suggestions reconciled again
/// against the winning content, searching `radius` chars around each claim,
/// and is listed in [`RedlineMetadata::rebased_modules`].
pub fn aggregate(
    id: impl Into<String>,
    modules: &[TerminalModuleData],
    source: &DocumentSource,
    radius: usize,
) -> Result<RedlineDocument, EmptyRedline> {
    if modules.is_empty() {
        return Err(EmptyRedline::NoTerminalModules);
    }

    let original_content = modules
        .iter()
        .find(|module| module.has_content())
        .map(|module| module.original_content.clone())
        .ok_or(EmptyRedline::NoContent {
            modules: modules.len(),
        })?;

    let mut suggestions = Vec::new();
    let mut source_modules: Vec<String> = Vec::new();
    let mut rebased_modules = Vec::new();
    for module in modules {
        if module.suggestions.is_empty() {
            continue;
        }
        let before = suggestions.len();
        if module.original_content == original_content {
            suggestions.extend(module.suggestions.iter().cloned());
        } else {
            let outcome = reconcile(&original_content, module.suggestions.clone(), radius);
            tracing::warn!(
                node_id = %module.node_id,
                module_type = %module.module_type,
                kept = outcome.suggestions.len(),
                dropped = outcome.dropped.len(),
                "module content differs from the document content, suggestions rebased"
            );
            suggestions.extend(outcome.suggestions);
            rebased_modules.push(RebasedModule {
                node_id: module.node_id.clone(),
                relocated: outcome.relocated,
                dropped: outcome.dropped,
            });
        }
        if suggestions.len() > before && !source_modules.contains(&module.module_type) {
            source_modules.push(module.module_type.clone());
        }
    }

    if suggestions.is_empty() {
        return Err(EmptyRedline::NoSuggestions {
            modules: modules.len(),
        });
    }

    let position_map = source.html.as_deref().and_then(|html| match PositionMap::from_html(html) {
        Ok(map) => Some(map),
        Err(err) => {
            tracing::warn!(error = %err, "could not build position map from source html");
            None
        }
    });

    let mut document = RedlineDocument {
        id: id.into(),
        current_content: original_content.clone(),
        original_content,
        suggestions,
        metadata: RedlineMetadata {
            file_name: source.file_name.clone(),
            file_type: source.file_type.clone(),
            last_modified: source.last_modified,
            total_suggestions: 0,
            accepted_suggestions: 0,
            rejected_suggestions: 0,
            source_modules,
            rebased_modules,
        },
        position_map,
    };
    document.refresh_counts();

    tracing::info!(
        id = %document.id,
        suggestions = document.metadata.total_suggestions,
        modules = document.metadata.source_modules.len(),
        "built redline document"
    );

    Ok(document)
}
