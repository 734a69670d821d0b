use std::fmt::Write;

use unicode_width::UnicodeWidthChar;

use crate::{Overlay, TextSpan};

/// Glyph drawn in place of a line break so the text stays on one line.
const NEWLINE_GLYPH: char = '↵';

struct IncludedOverlay {
    span: TextSpan,
    label: String,
}

/// Renders text with overlays underlined beneath it.
///
/// ```text
/// Hello world.↵↵This is bad grammer.
///                           ╰─────╯grammar("grammer" → "grammar")
/// ```
///
/// Line breaks are drawn as `↵` so every overlay lines up under a single
/// row. Overlays without a usable span, or reaching past the end of the
/// text, are listed with an `(unplaced)` marker instead of an underline.
pub struct OverlayDisplay<'a> {
    text: &'a str,
    include_overlays: Vec<IncludedOverlay>,
    unplaced: Vec<String>,
}

impl<'a> std::fmt::Display for OverlayDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display column of every char boundary, including the final one
        let mut columns = Vec::with_capacity(self.text.len() + 1);
        let mut opening_line = String::with_capacity(self.text.len());
        let mut column = 0usize;
        for ch in self.text.chars() {
            columns.push(column);
            let shown = if ch == '\n' { NEWLINE_GLYPH } else { ch };
            opening_line.push(shown);
            column += UnicodeWidthChar::width(shown).unwrap_or(0);
        }
        columns.push(column);

        f.write_str(&opening_line)?;

        for overlay in self.include_overlays.iter() {
            f.write_char('\n')?;

            let start_col = columns[overlay.span.start];
            let end_col = columns[overlay.span.end];
            for _ in 0..start_col {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;
            for _ in (start_col + 1)..end_col.saturating_sub(1) {
                f.write_char('─')?;
            }
            if end_col - start_col > 1 {
                f.write_char('╯')?;
            }

            f.write_str(&overlay.label)?;
        }

        for label in self.unplaced.iter() {
            write!(f, "\n(unplaced) {}", label)?;
        }

        Ok(())
    }
}

impl<'a> OverlayDisplay<'a> {
    pub fn new(text: &'a str) -> Self {
        OverlayDisplay {
            text,
            include_overlays: Vec::new(),
            unplaced: Vec::new(),
        }
    }

    /// Add a bare span with a label.
    pub fn include_span(&mut self, span: TextSpan, label: impl Into<String>) {
        let label = label.into();
        if span.start <= span.end && span.end <= self.text.chars().count() {
            self.include_overlays.push(IncludedOverlay { span, label });
        } else {
            self.unplaced.push(format!("{} @ {}", label, span));
        }
    }

    /// Add every overlay, labelled with its kind and proposed change.
    pub fn include<O: Overlay>(&mut self, overlays: &[O]) {
        for overlay in overlays {
            let label = format!(
                "{}({:?} → {:?})",
                overlay.overlay_kind(),
                overlay.original_text(),
                overlay.replacement_text()
            );
            match overlay.overlay_span() {
                Some(span) => self.include_span(span, label),
                None => self.unplaced.push(label),
            }
        }
    }

    /// Takes self
    pub fn with<O: Overlay>(mut self, overlays: &[O]) -> Self {
        self.include(overlays);
        self
    }

    /// Takes self, adds one labelled span
    pub fn with_span(mut self, span: TextSpan, label: impl Into<String>) -> Self {
        self.include_span(span, label);
        self
    }
}
