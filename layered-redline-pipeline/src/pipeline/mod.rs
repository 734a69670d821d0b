//! The full redline pass: detect, collect, reconcile, aggregate.

use std::sync::Arc;

use layered_redline_document::{aggregate, DocumentSource, EmptyRedline, RedlineDocument, TerminalModuleData};
use serde_json::Value;

use crate::collector::collect_terminal_data;
use crate::terminal::detect_terminals;
use crate::{PipelineFingerprint, PipelineGraph, PipelineOutput, RedlineConfig, RunWarning};

/// Everything one run produced.
///
/// A run always completes. `outcome` is either the document or the reason
/// there is none, and `warnings` explains anything skipped along the way.
#[derive(Debug, Clone)]
pub struct RedlineRun {
    pub outcome: Result<Arc<RedlineDocument>, EmptyRedline>,
    pub modules: Vec<TerminalModuleData>,
    pub warnings: Vec<RunWarning>,
    pub fingerprint: PipelineFingerprint,
}

impl RedlineRun {
    pub fn document(&self) -> Option<&Arc<RedlineDocument>> {
        self.outcome.as_ref().ok()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Runs the redline passes in order with one configuration.
#[derive(Debug, Clone, Default)]
pub struct RedlinePipeline {
    config: RedlineConfig,
}

impl RedlinePipeline {
    pub fn new(config: RedlineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RedlineConfig {
        &self.config
    }

    /// Fingerprint of the inputs a run depends on.
    pub fn fingerprint(output: &PipelineOutput, source: &DocumentSource) -> Result<PipelineFingerprint, serde_json::Error> {
        PipelineFingerprint::of(&(output, source))
    }

    /// Run on already-parsed output.
    pub fn run(
        &self,
        output: &PipelineOutput,
        graph: Option<&PipelineGraph>,
        source: &DocumentSource,
    ) -> RedlineRun {
        let mut warnings = Vec::new();
        let fingerprint = match Self::fingerprint(output, source) {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                warnings.push(RunWarning::MalformedOutput {
                    message: err.to_string(),
                });
                PipelineFingerprint::of_bytes(&[])
            }
        };

        let terminals = detect_terminals(output, graph, &self.config);
        let modules = collect_terminal_data(output, &terminals, graph, &self.config, &mut warnings);

        let outcome = aggregate(
            format!("redline-{}", fingerprint.short()),
            &modules,
            source,
            self.config.search_radius,
        )
        .map(Arc::new);
        if let Ok(document) = &outcome {
            warnings.extend(document.metadata.rebased_modules.iter().map(|rebased| {
                RunWarning::RebasedSuggestions {
                    node_id: rebased.node_id.clone(),
                    relocated: rebased.relocated,
                    dropped: rebased.dropped.len(),
                }
            }));
        }
        match &outcome {
            Ok(document) => tracing::info!(
                id = %document.id,
                terminals = terminals.len(),
                suggestions = document.metadata.total_suggestions,
                warnings = warnings.len(),
                "redline run complete"
            ),
            Err(empty) => tracing::warn!(
                terminals = terminals.len(),
                reason = %empty,
                "redline run produced no document"
            ),
        }

        RedlineRun {
            outcome,
            modules,
            warnings,
            fingerprint,
        }
    }

    /// Run on raw JSON values, as delivered by the execution layer.
    pub fn run_value(&self, output: &Value, graph: Option<&Value>, source: &DocumentSource) -> RedlineRun {
        let graph = graph.filter(|g| !g.is_null()).and_then(PipelineGraph::from_value);
        match PipelineOutput::from_value(output) {
            Ok(output) => self.run(&output, graph.as_ref(), source),
            Err(err) => {
                tracing::warn!(error = %err, "pipeline output could not be read");
                RedlineRun {
                    outcome: Err(EmptyRedline::NoTerminalModules),
                    modules: Vec::new(),
                    warnings: vec![RunWarning::MalformedOutput {
                        message: err.to_string(),
                    }],
                    fingerprint: PipelineFingerprint::of(output)
                        .unwrap_or_else(|_| PipelineFingerprint::of_bytes(&[])),
                }
            }
        }
    }
}
