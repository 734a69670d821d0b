//! Span types shared by every overlay producer.
//!
//! [`TextSpan`] is the char-based range every layer agrees on, and
//! [`Overlay`] is the seam between the document model (which owns the
//! suggestions) and the renderers in this crate (which only need to know
//! where a suggestion sits and what it says).

use serde::{Deserialize, Serialize};

/// A half-open range of `char` offsets: `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextSpan {
    /// Inclusive start char offset
    pub start: usize,
    /// Exclusive end char offset
    pub end: usize,
}

impl TextSpan {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Build a span from signed offsets claimed by upstream output.
    ///
    /// Returns `None` for negative or inverted ranges, and for offsets that
    /// do not fit a `usize` on this target.
    pub fn from_claimed(start: i64, end: i64) -> Option<Self> {
        if end < start {
            return None;
        }
        Some(Self::new(usize::try_from(start).ok()?, usize::try_from(end).ok()?))
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns true if `other` lies entirely within this span.
    pub fn contains(&self, other: &TextSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns true if the spans share at least one char.
    pub fn overlaps(&self, other: &TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Grow the span by `radius` on both sides, clamped to `0..limit`.
    pub fn expand(&self, radius: usize, limit: usize) -> TextSpan {
        TextSpan {
            start: self.start.saturating_sub(radius).min(limit),
            end: self.end.saturating_add(radius).min(limit),
        }
    }

    /// Distance between the starts of two spans.
    pub fn start_distance(&self, other: &TextSpan) -> usize {
        if self.start > other.start {
            self.start - other.start
        } else {
            other.start - self.start
        }
    }
}

impl std::fmt::Display for TextSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Something that can be painted over a span of text.
///
/// Implemented by the document model's suggestion type; the markup
/// applier and [`OverlayDisplay`](crate::OverlayDisplay) only see this
/// trait.
///
/// # Example
///
/// ```
/// use layered_redline::{Overlay, TextSpan};
///
/// struct Typo;
///
/// impl Overlay for Typo {
///     fn overlay_id(&self) -> &str { "typo-1" }
///     fn overlay_span(&self) -> Option<TextSpan> { Some(TextSpan::new(4, 9)) }
///     fn original_text(&self) -> &str { "wrold" }
///     fn replacement_text(&self) -> &str { "world" }
/// }
///
/// assert_eq!(Typo.overlay_kind(), "suggestion");
/// ```
pub trait Overlay {
    /// Stable identifier, carried into rendered markup.
    fn overlay_id(&self) -> &str;

    /// Position of the overlay, or `None` if the claimed span is unusable.
    fn overlay_span(&self) -> Option<TextSpan>;

    /// Text the overlay claims to cover.
    fn original_text(&self) -> &str;

    /// Text the overlay proposes instead.
    fn replacement_text(&self) -> &str;

    /// Short lowercase kind used for CSS classes and display labels.
    fn overlay_kind(&self) -> &str {
        "suggestion"
    }
}

impl<T: Overlay + ?Sized> Overlay for &T {
    fn overlay_id(&self) -> &str {
        (**self).overlay_id()
    }

    fn overlay_span(&self) -> Option<TextSpan> {
        (**self).overlay_span()
    }

    fn original_text(&self) -> &str {
        (**self).original_text()
    }

    fn replacement_text(&self) -> &str {
        (**self).replacement_text()
    }

    fn overlay_kind(&self) -> &str {
        (**self).overlay_kind()
    }
}
