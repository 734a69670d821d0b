//! Char ↔ byte offset mapping.

use crate::TextSpan;

/// Index over a string that answers char-offset questions in O(1)/O(log n).
///
/// Upstream positions are char offsets; Rust slicing wants byte offsets.
/// Every comparison of a claimed span against document text goes through
/// this type so that multi-byte characters (`§`, `⟦`, curly quotes) never
/// cause a slice to land inside a code point.
#[derive(Debug, Clone)]
pub struct TextIndex<'a> {
    text: &'a str,
    /// Byte offset of each char, plus a trailing entry for `text.len()`
    offsets: Vec<usize>,
}

impl<'a> TextIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Number of chars in the text.
    pub fn len_chars(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of a char offset. `len_chars()` maps to `text.len()`.
    pub fn byte_offset(&self, char_offset: usize) -> Option<usize> {
        self.offsets.get(char_offset).copied()
    }

    /// Char offset of a byte offset, if it sits on a char boundary.
    pub fn char_offset(&self, byte_offset: usize) -> Option<usize> {
        self.offsets.binary_search(&byte_offset).ok()
    }

    /// Slice the text by char span.
    pub fn slice(&self, span: TextSpan) -> Option<&'a str> {
        if span.end < span.start {
            return None;
        }
        let start = self.byte_offset(span.start)?;
        let end = self.byte_offset(span.end)?;
        self.text.get(start..end)
    }

    /// Every occurrence of `needle` lying entirely inside `window`.
    ///
    /// Occurrences may overlap. The window is clamped to the text.
    pub fn find_within(&self, needle: &str, window: TextSpan) -> Vec<TextSpan> {
        let mut found = Vec::new();
        if needle.is_empty() {
            return found;
        }

        let window = TextSpan::new(
            window.start.min(self.len_chars()),
            window.end.min(self.len_chars()),
        );
        let (Some(window_start), Some(haystack)) =
            (self.byte_offset(window.start), self.slice(window))
        else {
            return found;
        };

        let needle_chars = needle.chars().count();
        let mut from = 0;
        while let Some(pos) = haystack[from..].find(needle) {
            let byte_start = window_start + from + pos;
            if let Some(start) = self.char_offset(byte_start) {
                found.push(TextSpan::new(start, start + needle_chars));
            }
            // Step one char past this match start so overlapping matches are seen
            let step = haystack[from + pos..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(1);
            from += pos + step;
            if from >= haystack.len() {
                break;
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ascii_offsets_match_bytes() {
        let index = TextIndex::new("Hello world.");
        assert_eq!(index.len_chars(), 12);
        assert_eq!(index.byte_offset(6), Some(6));
        assert_eq!(index.slice(TextSpan::new(6, 11)), Some("world"));
    }

    #[test]
    fn multibyte_chars_count_once() {
        let index = TextIndex::new("§ 1983 ⟦P-00001⟧ claim");
        // '§' is 2 bytes, '⟦' and '⟧' are 3 bytes each
        assert_eq!(index.len_chars(), 22);
        assert_eq!(index.slice(TextSpan::new(0, 6)), Some("§ 1983"));
        assert_eq!(index.slice(TextSpan::new(7, 16)), Some("⟦P-00001⟧"));
        assert_eq!(index.char_offset(2), Some(1));
        // Byte 1 is inside '§'
        assert_eq!(index.char_offset(1), None);
    }

    #[test]
    fn slice_out_of_range_is_none() {
        let index = TextIndex::new("short");
        assert_eq!(index.slice(TextSpan::new(2, 9)), None);
        assert_eq!(index.slice(TextSpan::new(3, 2)), None);
        assert_eq!(index.slice(TextSpan::new(5, 5)), Some(""));
    }

    #[test]
    fn find_within_respects_window() {
        let index = TextIndex::new("the cat and the hat and the bat");
        let all = index.find_within("the", TextSpan::new(0, 31));
        assert_eq!(
            all,
            vec![TextSpan::new(0, 3), TextSpan::new(12, 15), TextSpan::new(24, 27)]
        );

        // A match straddling the window end is not reported
        let partial = index.find_within("the", TextSpan::new(10, 14));
        assert!(partial.is_empty());
    }

    #[test]
    fn find_within_reports_overlapping_matches() {
        let index = TextIndex::new("aaaa");
        let found = index.find_within("aa", TextSpan::new(0, 4));
        assert_eq!(
            found,
            vec![TextSpan::new(0, 2), TextSpan::new(1, 3), TextSpan::new(2, 4)]
        );
    }

    #[test]
    fn find_within_multibyte() {
        let index = TextIndex::new("«Tenant» owes «Tenant»");
        let found = index.find_within("Tenant", TextSpan::new(0, 100));
        assert_eq!(found, vec![TextSpan::new(1, 7), TextSpan::new(15, 21)]);
    }

    proptest! {
        #[test]
        fn char_and_byte_offsets_agree(text in "[a-z §⟦⟧é\n]{0,40}") {
            let index = TextIndex::new(&text);
            prop_assert_eq!(index.len_chars(), text.chars().count());
            for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
                prop_assert_eq!(index.byte_offset(char_idx), Some(byte_idx));
                prop_assert_eq!(index.char_offset(byte_idx), Some(char_idx));
                let single = ch.to_string();
                prop_assert_eq!(index.slice(TextSpan::new(char_idx, char_idx + 1)), Some(single.as_str()));
            }
        }
    }
}
