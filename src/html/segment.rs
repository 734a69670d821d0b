//! Tag/text decomposition of HTML with a plain-text coordinate system.

use serde::{Deserialize, Serialize};

use super::MarkupError;

/// Whether a segment is markup or document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Text,
    Tag,
}

/// A slice of raw HTML.
///
/// `start_pos`/`end_pos` are byte offsets into the raw HTML. For text
/// segments, `text_start_pos`/`text_end_pos` are char offsets into the
/// plain-text projection (tags contribute nothing, an entity contributes
/// one char).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlSegment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub content: String,
    pub start_pos: usize,
    pub end_pos: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_start_pos: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_end_pos: Option<usize>,
}

impl HtmlSegment {
    pub fn is_text(&self) -> bool {
        self.kind == SegmentKind::Text
    }
}

/// One plain-text char of a text segment and the raw bytes it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextUnit {
    /// Byte range within the segment content
    pub start: usize,
    pub end: usize,
    /// Decoded plain-text value
    pub decoded: String,
}

/// Elements whose bodies are never document text.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Split HTML into alternating tag and text segments.
///
/// Concatenating every segment's `content` reproduces the input exactly.
/// A `<` that does not start a tag (`a < b`) is treated as text. An opened
/// tag, comment, or raw-text element without its terminator is an error.
///
/// ```
/// use layered_redline::{segment_html, SegmentKind};
///
/// let segments = segment_html("<p>Fish &amp; chips</p>").unwrap();
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[1].kind, SegmentKind::Text);
/// assert_eq!(segments[1].text_start_pos, Some(0));
/// assert_eq!(segments[1].text_end_pos, Some(12));
/// ```
pub fn segment_html(html: &str) -> Result<Vec<HtmlSegment>, MarkupError> {
    let bytes = html.as_bytes();
    let mut segments = Vec::new();
    let mut text_pos = 0usize;
    let mut text_start = 0usize;
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        if bytes[cursor] == b'<' && starts_tag(bytes, cursor) {
            if text_start < cursor {
                push_text(&mut segments, html, text_start, cursor, &mut text_pos);
            }
            let tag_end = scan_tag_end(html, cursor)?;
            segments.push(HtmlSegment {
                kind: SegmentKind::Tag,
                content: html[cursor..tag_end].to_string(),
                start_pos: cursor,
                end_pos: tag_end,
                text_start_pos: None,
                text_end_pos: None,
            });
            cursor = tag_end;
            text_start = cursor;
        } else {
            cursor += 1;
        }
    }

    if text_start < bytes.len() {
        push_text(&mut segments, html, text_start, bytes.len(), &mut text_pos);
    }

    Ok(segments)
}

/// Decoded plain text of a segment stream.
pub fn plain_text(segments: &[HtmlSegment]) -> String {
    segments
        .iter()
        .filter(|segment| segment.is_text())
        .flat_map(|segment| text_units(&segment.content))
        .map(|unit| unit.decoded)
        .collect()
}

fn push_text(
    segments: &mut Vec<HtmlSegment>,
    html: &str,
    start: usize,
    end: usize,
    text_pos: &mut usize,
) {
    let content = &html[start..end];
    let len = text_units(content).len();
    segments.push(HtmlSegment {
        kind: SegmentKind::Text,
        content: content.to_string(),
        start_pos: start,
        end_pos: end,
        text_start_pos: Some(*text_pos),
        text_end_pos: Some(*text_pos + len),
    });
    *text_pos += len;
}

fn starts_tag(bytes: &[u8], at: usize) -> bool {
    match bytes.get(at + 1) {
        Some(next) => next.is_ascii_alphabetic() || matches!(next, b'/' | b'!' | b'?'),
        None => false,
    }
}

/// Byte offset just past the tag (or comment, or raw-text element) at `start`.
fn scan_tag_end(html: &str, start: usize) -> Result<usize, MarkupError> {
    let rest = &html[start..];

    if rest.starts_with("<!--") {
        return rest
            .find("-->")
            .map(|idx| start + idx + 3)
            .ok_or(MarkupError::UnterminatedTag { offset: start });
    }

    let bytes = rest.as_bytes();
    let mut quote: Option<u8> = None;
    let mut end = None;
    for (idx, &byte) in bytes.iter().enumerate().skip(1) {
        match quote {
            Some(q) if byte == q => quote = None,
            Some(_) => {}
            None if byte == b'"' || byte == b'\'' => quote = Some(byte),
            None if byte == b'>' => {
                end = Some(start + idx + 1);
                break;
            }
            None => {}
        }
    }
    let end = end.ok_or(MarkupError::UnterminatedTag { offset: start })?;

    // Bodies of <script>/<style> are swallowed into the opening tag segment
    let name = tag_name(&html[start..end]);
    if !html[start..end].starts_with("</") && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
        let closing = format!("</{}", name);
        let lower_rest = html[end..].to_ascii_lowercase();
        let close_at = lower_rest
            .find(&closing)
            .ok_or(MarkupError::UnterminatedTag { offset: start })?;
        let close_tag_start = end + close_at;
        return html[close_tag_start..]
            .find('>')
            .map(|idx| close_tag_start + idx + 1)
            .ok_or(MarkupError::UnterminatedTag {
                offset: close_tag_start,
            });
    }

    Ok(end)
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Break text-segment content into plain-text units.
///
/// `&name;` and `&#NN;`/`&#xHH;` entities become a single unit; every other
/// char is its own unit.
pub(crate) fn text_units(content: &str) -> Vec<TextUnit> {
    let mut units = Vec::new();
    let mut iter = content.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        if ch == '&' {
            if let Some((entity_len, decoded)) = parse_entity(&content[idx..]) {
                units.push(TextUnit {
                    start: idx,
                    end: idx + entity_len,
                    decoded,
                });
                while let Some(&(next_idx, _)) = iter.peek() {
                    if next_idx < idx + entity_len {
                        iter.next();
                    } else {
                        break;
                    }
                }
                continue;
            }
        }
        units.push(TextUnit {
            start: idx,
            end: idx + ch.len_utf8(),
            decoded: ch.to_string(),
        });
    }

    units
}

/// Parse an entity at the start of `s`, returning its byte length and value.
fn parse_entity(s: &str) -> Option<(usize, String)> {
    let semi = s.char_indices().take(12).find(|(_, c)| *c == ';')?.0;
    let body = &s[1..semi];
    if body.is_empty() {
        return None;
    }

    let decoded = if let Some(numeric) = body.strip_prefix('#') {
        let code = if let Some(hex) = numeric.strip_prefix('x').or_else(|| numeric.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            numeric.parse::<u32>().ok()?
        };
        char::from_u32(code)?.to_string()
    } else {
        if !body.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        match body {
            "amp" => "&".to_string(),
            "lt" => "<".to_string(),
            "gt" => ">".to_string(),
            "quot" => "\"".to_string(),
            "apos" => "'".to_string(),
            "nbsp" => "\u{a0}".to_string(),
            "sect" => "§".to_string(),
            "para" => "¶".to_string(),
            "ldquo" => "\u{201c}".to_string(),
            "rdquo" => "\u{201d}".to_string(),
            "lsquo" => "\u{2018}".to_string(),
            "rsquo" => "\u{2019}".to_string(),
            "mdash" => "\u{2014}".to_string(),
            "ndash" => "\u{2013}".to_string(),
            // Unknown names still occupy one plain-text position
            _ => s[..=semi].to_string(),
        }
    };

    Some((semi + 1, decoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(segments: &[HtmlSegment]) -> Vec<SegmentKind> {
        segments.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn segments_concatenate_to_input() {
        let html = r#"<div class="doc"><p>The Tenant <b>shall</b> pay.</p><!-- note --></div>"#;
        let segments = segment_html(html).unwrap();
        let rebuilt: String = segments.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(rebuilt, html);
        assert_eq!(plain_text(&segments), "The Tenant shall pay.");
    }

    #[test]
    fn text_positions_skip_tags() {
        let segments = segment_html("<p>ab</p><p>cd</p>").unwrap();
        assert_eq!(
            kinds(&segments),
            vec![
                SegmentKind::Tag,
                SegmentKind::Text,
                SegmentKind::Tag,
                SegmentKind::Tag,
                SegmentKind::Text,
                SegmentKind::Tag
            ]
        );
        assert_eq!(segments[1].text_start_pos, Some(0));
        assert_eq!(segments[1].text_end_pos, Some(2));
        assert_eq!(segments[4].text_start_pos, Some(2));
        assert_eq!(segments[4].text_end_pos, Some(4));
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        let segments = segment_html(r#"<a title="x > y">link</a>"#).unwrap();
        assert_eq!(segments[0].content, r#"<a title="x > y">"#);
        assert_eq!(plain_text(&segments), "link");
    }

    #[test]
    fn bare_less_than_is_text() {
        let segments = segment_html("<p>a < b</p>").unwrap();
        assert_eq!(plain_text(&segments), "a < b");
    }

    #[test]
    fn script_bodies_are_not_text() {
        let segments = segment_html("<p>Hi</p><script>if (a<b) {}</script><p>there</p>").unwrap();
        assert_eq!(plain_text(&segments), "Hithere");
    }

    #[test]
    fn unterminated_tag_is_an_error() {
        assert_eq!(
            segment_html("<p>ok</p><span class=\"x"),
            Err(MarkupError::UnterminatedTag { offset: 9 })
        );
        assert!(segment_html("<!-- open comment").is_err());
    }

    #[test]
    fn entities_are_single_units() {
        let units = text_units("A&amp;B&#167;&unknown;");
        let decoded: Vec<&str> = units.iter().map(|u| u.decoded.as_str()).collect();
        assert_eq!(decoded, vec!["A", "&", "B", "§", "&unknown;"]);
        assert_eq!(units[1].start, 1);
        assert_eq!(units[1].end, 6);
    }

    #[test]
    fn stray_ampersand_is_plain() {
        let units = text_units("Smith & Jones");
        assert_eq!(units.len(), 13);
    }
}
