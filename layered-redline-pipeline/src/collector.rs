//! Turning terminal modules into reconciled [`TerminalModuleData`].

use layered_redline::paragraph_anchor_at;
use layered_redline_document::{reconcile, ContentSource, TerminalModuleData};

use crate::content::resolve_content;
use crate::extract::{extractor_for, ExtractContext};
use crate::terminal::TerminalModule;
use crate::{PipelineGraph, PipelineOutput, RedlineConfig, RunWarning};

/// Resolve, extract and reconcile each terminal module.
///
/// Modules are returned in terminal order even when their content could
/// not be resolved, so callers can see what was attempted.
pub fn collect_terminal_data(
    output: &PipelineOutput,
    terminals: &[TerminalModule<'_>],
    graph: Option<&PipelineGraph>,
    config: &RedlineConfig,
    warnings: &mut Vec<RunWarning>,
) -> Vec<TerminalModuleData> {
    terminals
        .iter()
        .map(|terminal| collect_one(output, terminal, graph, config, warnings))
        .collect()
}

fn collect_one(
    output: &PipelineOutput,
    terminal: &TerminalModule<'_>,
    graph: Option<&PipelineGraph>,
    config: &RedlineConfig,
    warnings: &mut Vec<RunWarning>,
) -> TerminalModuleData {
    let module = terminal.result;
    let resolved = resolve_content(output, terminal.index, graph, config);
    match &resolved.source {
        ContentSource::Unresolved => warnings.push(RunWarning::UnresolvedContent {
            node_id: module.node_id.clone(),
        }),
        ContentSource::Heuristic { path } => warnings.push(RunWarning::HeuristicContent {
            node_id: module.node_id.clone(),
            path: path.clone(),
        }),
        _ => {}
    }

    let extracted = match extractor_for(&module.module_type) {
        Some(manifest) => {
            let ctx = ExtractContext {
                source_id: &module.node_id,
                module_type: &module.module_type,
                config,
            };
            (manifest.extract)(&module.result, &ctx)
        }
        None => {
            tracing::debug!(node_id = %module.node_id, module_type = %module.module_type, "no extractor for module type");
            warnings.push(RunWarning::NoExtractor {
                node_id: module.node_id.clone(),
                module_type: module.module_type.clone(),
            });
            Vec::new()
        }
    };
    let extracted_count = extracted.len();

    let mut outcome = reconcile(&resolved.content, extracted, config.search_radius);

    // Survivors have trusted positions; name their paragraph if upstream did not
    for suggestion in outcome.suggestions.iter_mut().filter(|s| s.paragraph_id.is_empty()) {
        if let Some(token) = paragraph_anchor_at(&resolved.content, suggestion.start_pos as usize) {
            suggestion.paragraph_id = token.paragraph_id();
        }
    }

    if !outcome.dropped.is_empty() {
        warnings.push(RunWarning::DroppedSuggestions {
            node_id: module.node_id.clone(),
            count: outcome.dropped.len(),
        });
    }

    tracing::debug!(
        node_id = %module.node_id,
        extracted = extracted_count,
        kept = outcome.suggestions.len(),
        relocated = outcome.relocated,
        dropped = outcome.dropped.len(),
        "collected terminal module"
    );

    TerminalModuleData::from_outcome(
        module.node_id.clone(),
        module.module_type.clone(),
        resolved.content,
        resolved.source,
        extracted_count,
        outcome,
    )
}
