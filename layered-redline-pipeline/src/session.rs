//! Process-local "last processed" state.
//!
//! The UI may ask for a redline many times for the same pipeline output
//! (re-renders, polling, tab switches). A [`RedlineSession`] remembers what
//! it last processed and skips the work when nothing changed. It is the
//! only place this state lives; [`RedlineSession::clear`] forgets it.

use std::sync::Arc;

use layered_redline_document::{apply_review_action, DocumentSource, RedlineDocument, ReviewAction, ReviewError};

use crate::{GraphChange, GraphSignature, PipelineFingerprint, PipelineGraph, PipelineOutput, RedlinePipeline, RedlineRun};

/// Result of [`RedlineSession::process`].
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// Same output and graph as last time; the cached run is returned
    Unchanged(Arc<RedlineRun>),
    /// The passes ran again
    Processed {
        run: Arc<RedlineRun>,
        /// Structural graph difference from the previous run, if any
        graph_change: Option<GraphChange>,
    },
}

impl SessionUpdate {
    pub fn run(&self) -> &Arc<RedlineRun> {
        match self {
            SessionUpdate::Unchanged(run) | SessionUpdate::Processed { run, .. } => run,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, SessionUpdate::Unchanged(_))
    }
}

#[derive(Debug)]
struct LastProcessed {
    fingerprint: PipelineFingerprint,
    graph: GraphSignature,
    run: Arc<RedlineRun>,
}

#[derive(Debug, Default)]
pub struct RedlineSession {
    pipeline: RedlinePipeline,
    last: Option<LastProcessed>,
}

impl RedlineSession {
    pub fn new(pipeline: RedlinePipeline) -> Self {
        Self {
            pipeline,
            last: None,
        }
    }

    /// Run the pipeline unless output and graph match the last run.
    ///
    /// A graph change invalidates the cached document even when the output
    /// itself is identical.
    pub fn process(
        &mut self,
        output: &PipelineOutput,
        graph: Option<&PipelineGraph>,
        source: &DocumentSource,
    ) -> SessionUpdate {
        let signature = graph.map(PipelineGraph::signature).unwrap_or_default();
        let fingerprint = RedlinePipeline::fingerprint(output, source).ok();

        if let (Some(last), Some(fingerprint)) = (&self.last, &fingerprint) {
            if last.fingerprint == *fingerprint && last.graph == signature {
                tracing::debug!(fingerprint = %fingerprint, "pipeline output unchanged, skipping");
                return SessionUpdate::Unchanged(Arc::clone(&last.run));
            }
        }

        let graph_change = self
            .last
            .as_ref()
            .map(|last| last.graph.diff(&signature))
            .filter(|change| !change.is_empty());
        if let Some(change) = &graph_change {
            tracing::info!(
                added_nodes = change.added_nodes.len(),
                removed_nodes = change.removed_nodes.len(),
                added_edges = change.added_edges.len(),
                removed_edges = change.removed_edges.len(),
                "pipeline graph changed, cached redline invalidated"
            );
        }

        let run = Arc::new(self.pipeline.run(output, graph, source));
        self.last = Some(LastProcessed {
            fingerprint: run.fingerprint.clone(),
            graph: signature,
            run: Arc::clone(&run),
        });

        SessionUpdate::Processed { run, graph_change }
    }

    /// Apply a review action to the current document, replacing it.
    pub fn review(&mut self, action: &ReviewAction) -> Result<Arc<RedlineDocument>, ReviewError> {
        let last = self.last.as_mut().ok_or(ReviewError::NoDocument)?;
        let current = last.run.document().ok_or(ReviewError::NoDocument)?;

        let next = Arc::new(apply_review_action(current, action)?);
        let run = RedlineRun {
            outcome: Ok(Arc::clone(&next)),
            modules: last.run.modules.clone(),
            warnings: last.run.warnings.clone(),
            fingerprint: last.run.fingerprint.clone(),
        };
        last.run = Arc::new(run);
        Ok(next)
    }

    /// The most recent run, if any.
    pub fn current(&self) -> Option<&Arc<RedlineRun>> {
        self.last.as_ref().map(|last| &last.run)
    }

    /// Forget the last processed state; the next `process` always runs.
    pub fn clear(&mut self) {
        if self.last.take().is_some() {
            tracing::debug!("redline session cleared");
        }
    }
}
