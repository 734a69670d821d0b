//! Redline document model for layered-redline.
//!
//! This crate owns the records the review UI renders and the passes that
//! make them trustworthy: position reconciliation, aggregation, and review
//! actions.
//!
//! ## Core Types
//!
//! - [`RedlineSuggestion`] - a proposed edit with claimed char offsets
//! - [`reconcile`] / [`ReconcileOutcome`] - bounded validation and relocation
//! - [`TerminalModuleData`] - reconciled output of one pipeline module
//! - [`aggregate`] / [`RedlineDocument`] - the merged, immutable snapshot
//! - [`apply_review_action`] - pending → accepted | rejected
//!
//! ## Example
//!
//! ```
//! use layered_redline_document::{reconcile, RedlineSuggestion, SuggestionType};
//!
//! let content = "Hello world.\n\nThis is bad grammer.";
//! let claimed = RedlineSuggestion::new("s1", SuggestionType::Grammar, "grammer", "grammar", 33, 40);
//!
//! let outcome = reconcile(content, vec![claimed], 50);
//! assert_eq!(outcome.relocated, 1);
//! assert_eq!(outcome.suggestions[0].start_pos, 26);
//! assert_eq!(outcome.suggestions[0].end_pos, 33);
//! ```

mod builder;
mod document;
mod model;
mod reconcile;
mod review;
mod terminal;

pub use builder::{aggregate, EmptyRedline};
pub use document::{DocumentSource, RebasedModule, RedlineDocument, RedlineMetadata};
pub use model::{PositionSource, RedlineSuggestion, Severity, SuggestionStatus, SuggestionType};
pub use reconcile::{
    is_valid_position, reconcile, DropReason, DroppedSuggestion, ReconcileOutcome,
    DEFAULT_SEARCH_RADIUS,
};
pub use review::{apply_review_action, ReviewAction, ReviewError};
pub use terminal::{ContentSource, TerminalMetadata, TerminalModuleData};
