//! Paragraph anchor tokens.
//!
//! Before a document is handed to AI passes, each paragraph of a processable
//! copy is prefixed with a `⟦P-NNNNN⟧` marker. Character offsets drift
//! between passes; paragraph identity does not. Anchors are generated once,
//! never renumbered, and regenerated from scratch if the text changes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;

use crate::{TextIndex, TextSpan};

/// Highest sequence number that fits the 5-digit format.
pub const MAX_ANCHOR_SEQUENCE: u32 = 99_999;

static ANCHOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"⟦P-(\d{5})⟧").expect("Invalid anchor regex"));

static EXACT_ANCHOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^⟦P-(\d{5})⟧$").expect("Invalid exact anchor regex"));

/// A paragraph marker, `⟦P-00001⟧` for the first paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorToken(u32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnchorParseError {
    #[error("not an anchor token: {0:?}")]
    Malformed(String),
    #[error("anchor sequence must be between 1 and {max}, found {0}", max = MAX_ANCHOR_SEQUENCE)]
    OutOfRange(u32),
}

impl AnchorToken {
    /// Create a token for a 1-based sequence number.
    pub fn new(sequence: u32) -> Option<Self> {
        if sequence == 0 || sequence > MAX_ANCHOR_SEQUENCE {
            None
        } else {
            Some(Self(sequence))
        }
    }

    pub fn sequence(&self) -> u32 {
        self.0
    }

    /// Paragraph identifier without brackets, e.g. `P-00003`.
    pub fn paragraph_id(&self) -> String {
        format!("P-{:05}", self.0)
    }

    /// Length of the rendered token in chars (always 9).
    pub fn char_len() -> usize {
        9
    }
}

impl std::fmt::Display for AnchorToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "⟦P-{:05}⟧", self.0)
    }
}

impl FromStr for AnchorToken {
    type Err = AnchorParseError;

    /// Accepts either the bracketed token or a bare `P-NNNNN` id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bracketed;
        let candidate = if trimmed.starts_with('⟦') {
            trimmed
        } else {
            bracketed = format!("⟦{}⟧", trimmed);
            bracketed.as_str()
        };

        let digits = EXACT_ANCHOR_REGEX
            .captures(candidate)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| AnchorParseError::Malformed(s.to_string()))?;
        let sequence: u32 = digits
            .as_str()
            .parse()
            .map_err(|_| AnchorParseError::Malformed(s.to_string()))?;

        AnchorToken::new(sequence).ok_or(AnchorParseError::OutOfRange(sequence))
    }
}

/// Output of [`generate_anchors`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchoredText {
    /// Normalized text the anchors were computed against
    pub processable_content: String,
    /// Processable text with one anchor before each paragraph
    pub anchored_content: String,
    /// Number of anchors inserted
    pub anchor_count: usize,
}

/// An anchor found in text, with its char span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    pub token: AnchorToken,
    pub span: TextSpan,
}

/// Insert a `⟦P-NNNNN⟧` token before the first character of every paragraph.
///
/// Paragraphs are runs of non-blank lines separated by blank lines. Line
/// endings are normalized to `\n` and surrounding blank lines are trimmed;
/// everything else, including the exact blank-line separators, is kept.
/// Anchors already in the input are removed first, so the numbering is
/// always regenerated.
///
/// ```
/// use layered_redline::generate_anchors;
///
/// let anchored = generate_anchors("\n\nOne.\nStill one.\n\n\nTwo.\n");
/// assert_eq!(anchored.processable_content, "One.\nStill one.\n\n\nTwo.");
/// assert_eq!(anchored.anchored_content, "⟦P-00001⟧One.\nStill one.\n\n\n⟦P-00002⟧Two.");
/// assert_eq!(anchored.anchor_count, 2);
///
/// let empty = generate_anchors("  \n\n ");
/// assert_eq!(empty.anchor_count, 0);
/// assert_eq!(empty.anchored_content, "");
/// ```
pub fn generate_anchors(text: &str) -> AnchoredText {
    let normalized = strip_anchors(text).replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return AnchoredText {
                processable_content: String::new(),
                anchored_content: String::new(),
                anchor_count: 0,
            }
        }
    };

    let kept = &lines[first..=last];
    let processable_content = kept.join("\n");

    let mut anchored_content = String::with_capacity(processable_content.len() + kept.len() * 12);
    let mut anchor_count = 0usize;
    let mut previous_blank = true;

    for (idx, line) in kept.iter().enumerate() {
        if idx > 0 {
            anchored_content.push('\n');
        }

        let blank = line.trim().is_empty();
        if !blank && previous_blank {
            let next = anchor_count as u32 + 1;
            match AnchorToken::new(next) {
                Some(token) => {
                    let indent = line.len() - line.trim_start().len();
                    anchored_content.push_str(&line[..indent]);
                    anchored_content.push_str(&token.to_string());
                    anchored_content.push_str(&line[indent..]);
                    anchor_count += 1;
                }
                None => {
                    tracing::warn!(
                        paragraph = next,
                        "anchor sequence exhausted, paragraph left unanchored"
                    );
                    anchored_content.push_str(line);
                }
            }
        } else {
            anchored_content.push_str(line);
        }
        previous_blank = blank;
    }

    AnchoredText {
        processable_content,
        anchored_content,
        anchor_count,
    }
}

/// Every anchor token in `text`, in order, with char spans.
pub fn find_anchors(text: &str) -> Vec<AnchorMatch> {
    let index = TextIndex::new(text);
    ANCHOR_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let sequence: u32 = caps.get(1)?.as_str().parse().ok()?;
            let token = AnchorToken::new(sequence)?;
            let start = index.char_offset(whole.start())?;
            let end = index.char_offset(whole.end())?;
            Some(AnchorMatch {
                token,
                span: TextSpan::new(start, end),
            })
        })
        .collect()
}

/// Remove every anchor token from `text`.
pub fn strip_anchors(text: &str) -> Cow<'_, str> {
    ANCHOR_REGEX.replace_all(text, "")
}

/// The anchor the paragraph containing `char_pos` would receive.
///
/// `text` is un-anchored processable content. Positions in blank separator
/// lines belong to the preceding paragraph.
pub fn paragraph_anchor_at(text: &str, char_pos: usize) -> Option<AnchorToken> {
    let mut paragraph = 0u32;
    let mut previous_blank = true;
    let mut line_start = 0usize;

    for line in text.split('\n') {
        if line_start > char_pos {
            break;
        }
        let blank = line.trim().is_empty();
        if !blank && previous_blank {
            paragraph += 1;
        }
        previous_blank = blank;
        line_start += line.chars().count() + 1;
    }

    AnchorToken::new(paragraph)
}
