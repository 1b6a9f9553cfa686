//! Text measurement for the standard Helvetica base fonts.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em for printable ASCII.
//! Characters outside that range are measured with the width of a digit.

/// Font weight used for measuring and drawing text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Measures rendered text width in points.
pub trait TextMetrics {
    fn text_width(&self, text: &str, weight: FontWeight, font_size: f32) -> f32;
}

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Metrics of the PDF standard fonts `Helvetica` and `Helvetica-Bold`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    fn char_width(c: char, weight: FontWeight) -> u16 {
        let table = match weight {
            FontWeight::Regular => &HELVETICA,
            FontWeight::Bold => &HELVETICA_BOLD,
        };
        let code = c as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            FALLBACK_WIDTH
        }
    }
}

impl TextMetrics for Helvetica {
    fn text_width(&self, text: &str, weight: FontWeight, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| u32::from(Self::char_width(c, weight)))
            .sum();
        units as f32 * font_size / 1000.0
    }
}

/// Break text into lines no wider than `max_width`.
///
/// Splits on explicit newlines first, then greedily on whitespace; a single
/// word wider than the limit is broken between characters. Always returns at
/// least one line.
pub fn wrap_text<M: TextMetrics + ?Sized>(
    metrics: &M,
    text: &str,
    weight: FontWeight,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    let fits = |s: &str| metrics.text_width(s, weight, font_size) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if fits(word) {
                line = word.to_string();
                continue;
            }
            for c in word.chars() {
                line.push(c);
                if !fits(&line) && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(c);
                }
            }
        }
        lines.push(line);
    }

    lines
}
