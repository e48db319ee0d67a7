//! # Text Measurement and Wrapping
//!
//! The engine does not own font shaping. It consumes a measurement
//! capability — `TextMeasurer` — and multiplies line counts by the fixed
//! line height to advance the cursor. The built-in implementation measures
//! with the standard Helvetica AFM advance widths, which is exactly what
//! the PDF serializer embeds, so measured and painted widths agree.
//!
//! Wrapping is greedy over UAX #14 break opportunities. A segment too wide
//! for the content width on its own falls back to a character split.

use crate::config::MM_PER_PT;
use unicode_linebreak::linebreaks;

/// Font selection for one block of text. Sizes are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub const fn regular(size: f64) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
        }
    }

    pub const fn bold(size: f64) -> Self {
        Self {
            size,
            bold: true,
            italic: false,
        }
    }

    pub const fn italic(size: f64) -> Self {
        Self {
            size,
            bold: false,
            italic: true,
        }
    }
}

/// Measurement capability consumed by the layout engine.
///
/// `wrap` contract: the result is never empty unless `text` is empty, and
/// every returned line measures at most `max_width` (a single glyph wider
/// than the content area is the one tolerated exception).
pub trait TextMeasurer {
    /// Rendered width of `text` in millimetres.
    fn text_width(&self, text: &str, font: &FontSpec) -> f64;

    /// Word-wrap `text` into lines of at most `max_width` millimetres.
    fn wrap(&self, text: &str, max_width: f64, font: &FontSpec) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            self.wrap_paragraph(paragraph, max_width, font, &mut lines);
        }
        lines
    }

    /// Wrap a single paragraph (no embedded newlines) into `out`.
    fn wrap_paragraph(
        &self,
        paragraph: &str,
        max_width: f64,
        font: &FontSpec,
        out: &mut Vec<String>,
    ) {
        if paragraph.trim().is_empty() {
            out.push(String::new());
            return;
        }

        let mut line_start = 0usize;
        let mut prev_break: Option<usize> = None;

        for (idx, _) in linebreaks(paragraph) {
            let candidate = paragraph[line_start..idx].trim_end();
            if self.text_width(candidate, font) <= max_width {
                prev_break = Some(idx);
                continue;
            }

            match prev_break.take() {
                Some(at) if at > line_start => {
                    out.push(paragraph[line_start..at].trim_end().to_string());
                    line_start = at;
                    if self.text_width(paragraph[line_start..idx].trim_end(), font) > max_width {
                        line_start = self.split_overlong(paragraph, line_start, idx, max_width, font, out);
                    }
                }
                _ => {
                    line_start = self.split_overlong(paragraph, line_start, idx, max_width, font, out);
                }
            }
            prev_break = Some(idx);
        }

        let tail = paragraph[line_start..].trim_end();
        if !tail.is_empty() {
            out.push(tail.to_string());
        }
    }

    /// Character-split `text[start..end]` until the remainder fits.
    /// Pushes the full chunks and returns the start of the remainder.
    fn split_overlong(
        &self,
        text: &str,
        start: usize,
        end: usize,
        max_width: f64,
        font: &FontSpec,
        out: &mut Vec<String>,
    ) -> usize {
        let mut chunk_start = start;
        loop {
            if self.text_width(text[chunk_start..end].trim_end(), font) <= max_width {
                return chunk_start;
            }
            let mut cut = None;
            for (offset, ch) in text[chunk_start..end].char_indices() {
                let candidate_end = chunk_start + offset + ch.len_utf8();
                if self.text_width(&text[chunk_start..candidate_end], font) <= max_width {
                    cut = Some(candidate_end);
                } else {
                    break;
                }
            }
            // A single glyph wider than the line still has to go somewhere.
            let cut = cut.unwrap_or_else(|| {
                let ch = text[chunk_start..end]
                    .chars()
                    .next()
                    .expect("overlong segment is non-empty");
                chunk_start + ch.len_utf8()
            });
            out.push(text[chunk_start..cut].to_string());
            chunk_start = cut;
        }
    }
}

/// Standard Helvetica advance widths in 1/1000 em for ASCII 0x20..=0x7E,
/// from the Adobe AFM files. Oblique shares the upright widths.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths, same layout as [`HELVETICA_WIDTHS`].
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500, // 'a'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Advance width for glyphs outside the ASCII table.
const FALLBACK_WIDTH: u16 = 556;

/// The built-in measurer, backed by the standard Helvetica metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMeasurer;

impl HelveticaMeasurer {
    fn char_units(ch: char, bold: bool) -> u16 {
        let table = if bold {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            table[(code - 0x20) as usize]
        } else {
            FALLBACK_WIDTH
        }
    }
}

impl TextMeasurer for HelveticaMeasurer {
    fn text_width(&self, text: &str, font: &FontSpec) -> f64 {
        let units: u32 = text
            .chars()
            .map(|ch| Self::char_units(ch, font.bold) as u32)
            .sum();
        units as f64 / 1000.0 * font.size * MM_PER_PT
    }
}
