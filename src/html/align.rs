//! Carrying spans from document content into an HTML text projection.
//!
//! Suggestions are positioned against the document's plain content, where
//! paragraphs are joined with blank lines. The text projection of the same
//! document's HTML carries no separators between block elements, so the two
//! agree on every visible character but not on whitespace.

use super::markup::apply_markup;
use super::segment::{plain_text, segment_html};
use super::{MarkupError, MarkupReport};
use crate::{Overlay, TextSpan};

/// Char-offset correspondence between two texts that differ only in whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAlignment {
    /// Target offset of each source char, `None` where it has no counterpart
    targets: Vec<Option<usize>>,
}

impl TextAlignment {
    /// Align `source` onto `target`.
    ///
    /// Equal chars are paired in order; whitespace present on only one side
    /// is skipped. At the first non-whitespace disagreement the rest of the
    /// source stays unaligned.
    pub fn new(source: &str, target: &str) -> Self {
        let source: Vec<char> = source.chars().collect();
        let target: Vec<char> = target.chars().collect();
        let mut targets = vec![None; source.len()];

        let (mut i, mut j) = (0, 0);
        while i < source.len() {
            match target.get(j) {
                Some(t) if *t == source[i] => {
                    targets[i] = Some(j);
                    i += 1;
                    j += 1;
                }
                _ if source[i].is_whitespace() => i += 1,
                Some(t) if t.is_whitespace() => j += 1,
                _ => break,
            }
        }

        Self { targets }
    }

    /// The target span covering `span`, if both of its ends are aligned.
    pub fn project(&self, span: TextSpan) -> Option<TextSpan> {
        if span.is_empty() {
            return None;
        }
        let start = (*self.targets.get(span.start)?)?;
        let last = (*self.targets.get(span.end - 1)?)?;
        (last >= start).then(|| TextSpan::new(start, last + 1))
    }
}

/// An overlay re-positioned into another coordinate system.
struct Aligned<'o, O> {
    overlay: &'o O,
    span: Option<TextSpan>,
}

impl<O: Overlay> Overlay for Aligned<'_, O> {
    fn overlay_id(&self) -> &str {
        self.overlay.overlay_id()
    }

    fn overlay_span(&self) -> Option<TextSpan> {
        self.span
    }

    fn original_text(&self) -> &str {
        self.overlay.original_text()
    }

    fn replacement_text(&self) -> &str {
        self.overlay.replacement_text()
    }

    fn overlay_kind(&self) -> &str {
        self.overlay.overlay_kind()
    }
}

/// Like [`apply_markup`], for overlays positioned against `content` rather
/// than against the HTML's own text projection.
///
/// When the projection equals `content` the overlays are applied as they
/// are. Otherwise each span is carried across a [`TextAlignment`]; one that
/// cannot be aligned is reported as skipped with an invalid span.
pub fn apply_markup_to_content<O: Overlay>(
    html: &str,
    content: &str,
    overlays: &[O],
) -> Result<MarkupReport, MarkupError> {
    if overlays.is_empty() {
        return apply_markup(html, overlays);
    }

    let text = plain_text(&segment_html(html)?);
    if text == content {
        return apply_markup(html, overlays);
    }

    let alignment = TextAlignment::new(content, &text);
    let aligned: Vec<Aligned<'_, O>> = overlays
        .iter()
        .map(|overlay| Aligned {
            overlay,
            span: overlay.overlay_span().and_then(|span| alignment.project(span)),
        })
        .collect();
    apply_markup(html, &aligned)
}

/// Like [`apply_markup_to_content`], but any failure yields the original HTML.
pub fn apply_markup_to_content_or_original<O: Overlay>(html: &str, content: &str, overlays: &[O]) -> String {
    match apply_markup_to_content(html, content, overlays) {
        Ok(report) => report.html,
        Err(err) => {
            tracing::warn!(error = %err, "markup application failed, returning original html");
            html.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SkipReason;

    struct Fix(&'static str, TextSpan, &'static str);

    impl Overlay for Fix {
        fn overlay_id(&self) -> &str {
            self.0
        }
        fn overlay_span(&self) -> Option<TextSpan> {
            Some(self.1)
        }
        fn original_text(&self) -> &str {
            self.2
        }
        fn replacement_text(&self) -> &str {
            "x"
        }
    }

    #[test]
    fn separators_are_skipped_on_either_side() {
        let alignment = TextAlignment::new("Hello world.\n\nThis is bad grammer.", "Hello world.This is bad grammer.");
        assert_eq!(alignment.project(TextSpan::new(26, 33)), Some(TextSpan::new(24, 31)));
        assert_eq!(alignment.project(TextSpan::new(0, 5)), Some(TextSpan::new(0, 5)));
        // The separator itself has no counterpart
        assert_eq!(alignment.project(TextSpan::new(12, 14)), None);

        let reverse = TextAlignment::new("ab", "a\n b");
        assert_eq!(reverse.project(TextSpan::new(1, 2)), Some(TextSpan::new(3, 4)));
    }

    #[test]
    fn disagreement_stops_alignment() {
        let alignment = TextAlignment::new("one two three", "one too three");
        assert_eq!(alignment.project(TextSpan::new(0, 3)), Some(TextSpan::new(0, 3)));
        assert_eq!(alignment.project(TextSpan::new(8, 13)), None);
    }

    #[test]
    fn later_paragraphs_are_marked_up() {
        let html = "<p>Hello world.</p><p>This is bad grammer.</p>";
        let content = "Hello world.\n\nThis is bad grammer.";
        let overlays = [
            Fix("g1", TextSpan::new(26, 33), "grammer"),
            Fix("g0", TextSpan::new(0, 5), "Hello"),
        ];

        let report = apply_markup_to_content(html, content, &overlays).unwrap();
        assert_eq!(report.applied, 2);
        assert!(report.skipped.is_empty());
        assert!(report.html.contains(r#"data-suggestion-id="g1" data-original="grammer" data-suggested="x">grammer</span>."#));

        // Read as projection offsets, the same span runs past the text
        let direct = apply_markup(html, &overlays[..1]).unwrap();
        assert_eq!(direct.applied, 0);
    }

    #[test]
    fn unaligned_spans_are_reported() {
        let report = apply_markup_to_content("<p>Other text</p>", "Some text", &[Fix("s", TextSpan::new(0, 4), "Some")]).unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(report.skipped[0].reason, SkipReason::InvalidSpan);
        assert_eq!(report.html, "<p>Other text</p>");
    }
}
