#![doc(
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Text coordinates for redline review.
//!
//! Everything downstream of the review pipeline talks about positions in a
//! document: AI modules claim character offsets, the reconciler checks them,
//! and the viewer paints overlays on top of them. This crate owns the
//! coordinate system those layers share.
//!
//! ## Core Types
//!
//! - [`TextSpan`] / [`TextIndex`] - char-based spans and char↔byte mapping
//! - [`AnchorToken`] / [`generate_anchors`] - stable `⟦P-00001⟧` paragraph markers
//! - [`Overlay`] - anything that can be painted onto a span of text
//! - [`segment_html`] / [`apply_markup`] - HTML-aware overlay application
//! - [`OverlayDisplay`] - text rendering of overlays for snapshot tests
//!
//! All offsets are counted in `char`s (Unicode scalar values), never bytes.
//!
//! ## Example
//!
//! ```
//! use layered_redline::{generate_anchors, strip_anchors};
//!
//! let anchored = generate_anchors("First paragraph.\n\nSecond paragraph.");
//! assert_eq!(anchored.anchor_count, 2);
//! assert_eq!(
//!     anchored.anchored_content,
//!     "⟦P-00001⟧First paragraph.\n\n⟦P-00002⟧Second paragraph."
//! );
//! assert_eq!(strip_anchors(&anchored.anchored_content), anchored.processable_content);
//! ```

mod anchor;
mod display;
mod html;
mod span;
mod text_index;

pub use anchor::{
    find_anchors, generate_anchors, paragraph_anchor_at, strip_anchors, AnchorMatch,
    AnchorParseError, AnchorToken, AnchoredText, MAX_ANCHOR_SEQUENCE,
};
pub use display::OverlayDisplay;
pub use html::{
    apply_markup, apply_markup_or_original, apply_markup_to_content,
    apply_markup_to_content_or_original, plain_text, segment_html, HtmlSegment, MarkupError,
    MarkupReport, PositionMap, PositionMapEntry, SegmentKind, SkipReason, SkippedOverlay,
    TextAlignment,
};
pub use span::{Overlay, TextSpan};
pub use text_index::TextIndex;
