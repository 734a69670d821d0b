//! Splicing suggestion markup into HTML text segments.

use serde::{Deserialize, Serialize};

use super::segment::{segment_html, text_units, HtmlSegment};
use super::MarkupError;
use crate::{Overlay, TextSpan};

/// Why an overlay was left out of the rendered markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// No usable span
    InvalidSpan,
    /// Span starts and ends in different text segments
    CrossesTag,
    /// Span overlaps an overlay that was already applied
    Overlap,
    /// Projected text does not match the overlay's original text
    TextMismatch,
}

/// An overlay that was not applied, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedOverlay {
    pub id: String,
    pub reason: SkipReason,
}

/// Result of one markup pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupReport {
    pub html: String,
    pub applied: usize,
    pub skipped: Vec<SkippedOverlay>,
}

/// A planned splice inside one text segment (byte offsets in segment content).
struct Splice<'o> {
    start: usize,
    end: usize,
    open_tag: String,
    id: &'o str,
}

/// Wrap each overlay's span in a `<span class="redline-suggestion …">`.
///
/// Offsets are plain-text char offsets. Tags are copied through untouched;
/// overlays that would have to split a tag, overlap an earlier overlay, or
/// whose projected text differs from [`Overlay::original_text`] are skipped
/// and reported. With no overlays the input is returned unchanged without
/// being parsed.
pub fn apply_markup<O: Overlay>(html: &str, overlays: &[O]) -> Result<MarkupReport, MarkupError> {
    if overlays.is_empty() {
        return Ok(MarkupReport {
            html: html.to_string(),
            applied: 0,
            skipped: Vec::new(),
        });
    }

    let segments = segment_html(html)?;

    let mut ordered: Vec<&O> = overlays.iter().collect();
    ordered.sort_by_key(|o| o.overlay_span().map(|s| (s.start, s.end)));

    let mut splices: Vec<Vec<Splice<'_>>> = segments.iter().map(|_| Vec::new()).collect();
    let mut skipped = Vec::new();
    let mut last_applied: Option<TextSpan> = None;

    for overlay in ordered {
        let skip = |reason| SkippedOverlay {
            id: overlay.overlay_id().to_string(),
            reason,
        };

        let span = match overlay.overlay_span() {
            Some(span) if !span.is_empty() => span,
            _ => {
                skipped.push(skip(SkipReason::InvalidSpan));
                continue;
            }
        };

        if last_applied.map_or(false, |prev| prev.overlaps(&span)) {
            tracing::debug!(id = overlay.overlay_id(), %span, "overlay overlaps previous, skipped");
            skipped.push(skip(SkipReason::Overlap));
            continue;
        }

        let Some((segment_idx, segment)) = enclosing_segment(&segments, span) else {
            tracing::debug!(id = overlay.overlay_id(), %span, "overlay crosses a tag boundary, skipped");
            skipped.push(skip(SkipReason::CrossesTag));
            continue;
        };

        let seg_start = segment.text_start_pos.unwrap_or(0);
        let units = text_units(&segment.content);
        let local = (span.start - seg_start)..(span.end - seg_start);
        let (Some(first), Some(last)) = (units.get(local.start), units.get(local.end - 1)) else {
            skipped.push(skip(SkipReason::CrossesTag));
            continue;
        };

        let projected: String = units[local.clone()].iter().map(|u| u.decoded.as_str()).collect();
        if projected != overlay.original_text() {
            tracing::debug!(
                id = overlay.overlay_id(),
                expected = overlay.original_text(),
                found = %projected,
                "overlay text does not match html, skipped"
            );
            skipped.push(skip(SkipReason::TextMismatch));
            continue;
        }

        splices[segment_idx].push(Splice {
            start: first.start,
            end: last.end,
            open_tag: open_tag(overlay),
            id: overlay.overlay_id(),
        });
        last_applied = Some(span);
    }

    let mut output = String::with_capacity(html.len() + splices.iter().map(Vec::len).sum::<usize>() * 96);
    let mut applied = 0;
    for (idx, segment) in segments.iter().enumerate() {
        if splices[idx].is_empty() {
            output.push_str(&segment.content);
            continue;
        }

        let content = segment.content.as_str();
        let mut cursor = 0;
        for splice in &splices[idx] {
            let before = content.get(cursor..splice.start);
            let marked = content.get(splice.start..splice.end);
            let (Some(before), Some(marked)) = (before, marked) else {
                return Err(MarkupError::Splice {
                    segment: idx,
                    start: splice.start,
                    end: splice.end,
                });
            };
            output.push_str(before);
            output.push_str(&splice.open_tag);
            output.push_str(marked);
            output.push_str("</span>");
            cursor = splice.end;
            applied += 1;
            tracing::trace!(id = splice.id, segment = idx, "overlay applied");
        }
        output.push_str(content.get(cursor..).unwrap_or_default());
    }

    Ok(MarkupReport {
        html: output,
        applied,
        skipped,
    })
}

/// Like [`apply_markup`], but any failure yields the original HTML.
pub fn apply_markup_or_original<O: Overlay>(html: &str, overlays: &[O]) -> String {
    match apply_markup(html, overlays) {
        Ok(report) => report.html,
        Err(err) => {
            tracing::warn!(error = %err, "markup application failed, returning original html");
            html.to_string()
        }
    }
}

fn enclosing_segment(segments: &[HtmlSegment], span: TextSpan) -> Option<(usize, &HtmlSegment)> {
    segments.iter().enumerate().find(|(_, segment)| {
        match (segment.text_start_pos, segment.text_end_pos) {
            (Some(start), Some(end)) => TextSpan::new(start, end).contains(&span),
            _ => false,
        }
    })
}

fn open_tag<O: Overlay>(overlay: &O) -> String {
    let kind: String = overlay
        .overlay_kind()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    format!(
        r#"<span class="redline-suggestion redline-{}" data-suggestion-id="{}" data-original="{}" data-suggested="{}">"#,
        kind,
        escape_attr(overlay.overlay_id()),
        escape_attr(overlay.original_text()),
        escape_attr(overlay.replacement_text()),
    )
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
