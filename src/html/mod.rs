//! HTML-aware overlay application.
//!
//! When the source document is HTML, suggestions are positioned against the
//! plain-text projection of that HTML. This module maps between the two
//! coordinate systems and splices suggestion markup into text segments
//! without ever touching a tag.

mod align;
mod markup;
mod segment;

pub use align::{apply_markup_to_content, apply_markup_to_content_or_original, TextAlignment};
pub use markup::{apply_markup, apply_markup_or_original, MarkupReport, SkipReason, SkippedOverlay};
pub use segment::{plain_text, segment_html, HtmlSegment, SegmentKind};

use serde::{Deserialize, Serialize};

/// Failures while decomposing or rebuilding HTML.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    /// A tag, comment, or raw-text element was opened but never closed.
    #[error("unterminated tag starting at byte {offset}")]
    UnterminatedTag { offset: usize },

    /// A computed splice point did not land on a valid boundary.
    #[error("cannot splice segment {segment} at bytes {start}..{end}")]
    Splice {
        segment: usize,
        start: usize,
        end: usize,
    },
}

/// Text-segment correspondence between plain-text and raw-HTML offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMapEntry {
    pub text_start_pos: usize,
    pub text_end_pos: usize,
    pub html_start_pos: usize,
    pub html_end_pos: usize,
}

/// Plain-text ↔ HTML position map for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMap {
    pub entries: Vec<PositionMapEntry>,
}

impl PositionMap {
    /// Build the map from raw HTML.
    pub fn from_html(html: &str) -> Result<Self, MarkupError> {
        let entries = segment_html(html)?
            .into_iter()
            .filter_map(|segment| {
                Some(PositionMapEntry {
                    text_start_pos: segment.text_start_pos?,
                    text_end_pos: segment.text_end_pos?,
                    html_start_pos: segment.start_pos,
                    html_end_pos: segment.end_pos,
                })
            })
            .collect();
        Ok(Self { entries })
    }

    /// Total length of the plain-text projection.
    pub fn text_len(&self) -> usize {
        self.entries.last().map(|e| e.text_end_pos).unwrap_or(0)
    }

    /// The text segment containing a plain-text position.
    pub fn entry_at(&self, text_pos: usize) -> Option<&PositionMapEntry> {
        self.entries
            .iter()
            .find(|e| e.text_start_pos <= text_pos && text_pos < e.text_end_pos)
    }
}
