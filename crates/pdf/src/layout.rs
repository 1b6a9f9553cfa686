//! Report layout planning.
//!
//! Decides page orientation, font sizes and per-column widths/alignment for
//! the rendered tables, and computes summary statistics for numeric columns.

use crate::metrics::{FontWeight, TextMetrics};
use finreport_table::{CellValue, Row};
use serde::{Deserialize, Serialize};

/// Horizontal space added to every measured column width
pub const COLUMN_PADDING: f32 = 6.0;

/// Reports with more columns than this are laid out in landscape
pub const LANDSCAPE_THRESHOLD: usize = 8;

/// Text alignment inside a cell or relative to a drawing anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Computed width and alignment for one rendered column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub column: String,
    pub width: f32,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape once the column count passes [`LANDSCAPE_THRESHOLD`]
    pub fn for_column_count(columns: usize) -> Self {
        if columns > LANDSCAPE_THRESHOLD {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Font sizes for the title, body text and tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontScale {
    pub title: f32,
    pub body: f32,
    pub table: f32,
}

impl FontScale {
    pub const MAX_TITLE: f32 = 24.0;
    pub const MAX_BODY: f32 = 12.0;
    pub const MAX_TABLE: f32 = 10.0;

    /// Sizes proportional to the page width, each clamped to its maximum
    pub fn for_page_width(page_width: f32) -> Self {
        Self {
            title: (page_width / 25.0).min(Self::MAX_TITLE),
            body: (page_width / 50.0).min(Self::MAX_BODY),
            table: (page_width / 60.0).min(Self::MAX_TABLE),
        }
    }
}

fn cell<'r>(row: &'r Row, column: &str) -> Option<&'r CellValue> {
    row.get(column)
}

/// A column is numeric when at least one of its values parses as a number
pub fn is_numeric_column(rows: &[&Row], column: &str) -> bool {
    rows.iter()
        .any(|row| cell(row, column).and_then(CellValue::as_number).is_some())
}

/// Compute per-column widths and alignment.
///
/// Each column is as wide as its widest header or cell plus
/// [`COLUMN_PADDING`]. When the columns do not fit between the margins they
/// are all shrunk by one common factor; they are never stretched.
pub fn compute_layout<M: TextMetrics + ?Sized>(
    headers: &[String],
    rows: &[&Row],
    page_width: f32,
    margin: f32,
    metrics: &M,
    font_size: f32,
) -> Vec<ColumnLayout> {
    let mut columns: Vec<ColumnLayout> = headers
        .iter()
        .map(|header| {
            let header_width = metrics.text_width(header, FontWeight::Bold, font_size);
            let widest_cell = rows
                .iter()
                .filter_map(|row| cell(row, header))
                .map(|value| metrics.text_width(&value.as_text(), FontWeight::Regular, font_size))
                .fold(0.0_f32, f32::max);

            let alignment = if is_numeric_column(rows, header) {
                Alignment::Right
            } else {
                Alignment::Left
            };

            ColumnLayout {
                column: header.clone(),
                width: header_width.max(widest_cell) + COLUMN_PADDING,
                alignment,
            }
        })
        .collect();

    let available = (page_width - 2.0 * margin).max(0.0);
    let total: f32 = columns.iter().map(|c| c.width).sum();
    if total > available && total > 0.0 {
        let factor = (available / total).min(1.0);
        tracing::debug!(total, available, factor, "Scaling columns to fit page");
        for column in &mut columns {
            column.width *= factor;
        }
    }

    columns
}

/// Statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub column: String,
    pub sum: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    /// Number of cells that parsed as numbers
    pub count: usize,
}

/// Sum, average, max and min for every numeric column, in header order.
///
/// Only cells that parse as numbers contribute.
pub fn summarize(headers: &[String], rows: &[&Row]) -> Vec<SummaryRow> {
    headers
        .iter()
        .filter_map(|header| {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|row| cell(row, header).and_then(CellValue::as_number))
                .collect();
            if values.is_empty() {
                return None;
            }

            let sum: f64 = values.iter().sum();
            Some(SummaryRow {
                column: header.clone(),
                sum,
                average: sum / values.len() as f64,
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                count: values.len(),
            })
        })
        .collect()
}

/// Format a statistic with at most two decimals, dropping trailing zeros.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        return format!("{rounded:.0}");
    }
    format!("{rounded:.2}")
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
