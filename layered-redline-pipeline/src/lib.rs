//! Pipeline-facing passes for layered-redline.
//!
//! Takes whatever the module pipeline produced, finds the terminal modules,
//! pulls suggestions out of their results, and hands reconciled data to the
//! document builder.
//!
//! ## Core Types
//!
//! - [`PipelineOutput`] / [`PipelineGraph`] - lenient views of upstream JSON
//! - [`detect_terminals`] - which modules' results to reconcile
//! - [`EXTRACTOR_MANIFESTS`] - grammar and citation extractors by module type
//! - [`RedlinePipeline`] - the full pass, configured by [`RedlineConfig`]
//! - [`RedlineSession`] - skips unchanged re-runs and holds the current document
//!
//! ## Example
//!
//! ```
//! use layered_redline_pipeline::{DocumentSource, RedlinePipeline, RedlineConfig};
//! use serde_json::json;
//!
//! let output = json!({
//!     "results": [
//!         { "nodeId": "in", "moduleType": "document-input",
//!           "result": { "content": "Hello world.\n\nThis is bad grammer." } },
//!         { "nodeId": "g", "moduleType": "grammar-checker",
//!           "result": { "suggestions": [
//!               { "originalText": "grammer", "suggestedText": "grammar", "startPos": 33, "endPos": 40 }
//!           ] } }
//!     ]
//! });
//!
//! let run = RedlinePipeline::new(RedlineConfig::default())
//!     .run_value(&output, None, &DocumentSource::new("memo.txt", "txt"));
//! let document = run.document().unwrap();
//! assert_eq!(document.suggestions[0].start_pos, 26);
//! assert_eq!(document.suggestions[0].paragraph_id, "P-00002");
//! ```

mod access;
mod collector;
mod config;
mod content;
mod diagnostics;
mod extract;
mod fingerprint;
mod graph;
mod output;
mod pipeline;
mod session;
mod terminal;

pub use access::{lookup, probe_array, probe_bool, probe_f64, probe_i64, probe_str, AccessPath};
pub use collector::collect_terminal_data;
pub use config::{ConfigError, RedlineConfig};
pub use content::{
    looks_like_prose, resolve_content, ResolvedContent, DIRECT_CONTENT_PATHS,
    METADATA_CONTENT_PATHS, PARAGRAPH_LIST_PATHS,
};
pub use diagnostics::RunWarning;
pub use extract::{
    classify_severity, classify_type, extract_citations, extract_grammar, extractor_for,
    extractor_infos, ExtractContext, ExtractFn, ExtractorInfo, ExtractorManifest,
    EXTRACTOR_MANIFESTS,
};
pub use fingerprint::PipelineFingerprint;
pub use graph::{GraphChange, GraphEdge, GraphNode, GraphNodeData, GraphSignature, PipelineGraph};
pub use output::{ModuleResult, OutputError, PipelineOutput, ResultsShape};
pub use pipeline::{RedlinePipeline, RedlineRun};
pub use session::{RedlineSession, SessionUpdate};
pub use terminal::{detect_terminals, TerminalModule, TerminalReason};

// The document model travels with every run
pub use layered_redline_document::{
    DocumentSource, EmptyRedline, RedlineDocument, RedlineSuggestion, ReviewAction, ReviewError,
};
