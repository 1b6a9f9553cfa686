//! Paginated table drawing.
//!
//! Draws a header row and body rows using precomputed [`ColumnLayout`]s.
//! Rows that would cross the bottom margin move to a new page, where the
//! header row is repeated. Cell text wraps to the column width.

use crate::canvas::{Canvas, Color, Rect, TextStyle};
use crate::error::Result;
use crate::layout::{Alignment, ColumnLayout, COLUMN_PADDING};
use crate::metrics::{wrap_text, FontWeight};

/// Space kept free below the table for the page footer
pub const FOOTER_RESERVE: f32 = 16.0;

const CELL_PADDING_Y: f32 = 2.0;
const LINE_SPACING: f32 = 1.15;

/// A table ready to draw.
#[derive(Debug, Clone)]
pub struct TableBlock<'a> {
    pub columns: &'a [ColumnLayout],
    pub body: Vec<Vec<String>>,
    pub font_size: f32,
    /// Left edge, top edge of continuation pages, and bottom margin
    pub margin: f32,
    /// Top edge on the starting page
    pub start_y: f32,
    pub striped: bool,
}

struct PreparedRow {
    lines: Vec<Vec<String>>,
    height: f32,
}

impl TableBlock<'_> {
    fn line_height(&self) -> f32 {
        self.font_size * LINE_SPACING
    }

    fn prepare<C: Canvas + ?Sized>(&self, canvas: &C, cells: &[String], weight: FontWeight) -> PreparedRow {
        let lines: Vec<Vec<String>> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let text = cells.get(i).map(String::as_str).unwrap_or_default();
                let max_width = (column.width - COLUMN_PADDING).max(0.0);
                wrap_text(canvas, text, weight, self.font_size, max_width)
            })
            .collect();
        let line_count = lines.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let height = line_count as f32 * self.line_height() + 2.0 * CELL_PADDING_Y;
        PreparedRow { lines, height }
    }

    fn total_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    fn draw_row<C: Canvas + ?Sized>(&self, canvas: &mut C, row: &PreparedRow, y: f32, style: TextStyle, fill: Option<Color>) {
        if let Some(color) = fill {
            canvas.fill_rect(
                Rect {
                    x: self.margin,
                    y,
                    width: self.total_width(),
                    height: row.height,
                },
                color,
            );
        }

        let mut x = self.margin;
        for (column, lines) in self.columns.iter().zip(&row.lines) {
            let anchor = match column.alignment {
                Alignment::Left => x + COLUMN_PADDING / 2.0,
                Alignment::Center => x + column.width / 2.0,
                Alignment::Right => x + column.width - COLUMN_PADDING / 2.0,
            };
            let mut baseline = y + CELL_PADDING_Y + self.font_size;
            for line in lines {
                if !line.is_empty() {
                    canvas.draw_text(line, anchor, baseline, style.align(column.alignment));
                }
                baseline += self.line_height();
            }
            x += column.width;
        }

        let bottom = y + row.height;
        canvas.stroke_line(
            (self.margin, bottom),
            (self.margin + self.total_width(), bottom),
            Color::RULE,
            0.5,
        );
    }
}

/// Draw a table, paginating as needed.
///
/// `did_draw_page` is called once for every page the table touched,
/// including the page it started on, after drawing on that page finished.
/// Returns the y position just below the last row.
pub fn draw_table<C: Canvas>(
    canvas: &mut C,
    block: &TableBlock<'_>,
    header: &[String],
    did_draw_page: &mut dyn FnMut(&mut C, usize),
) -> Result<f32> {
    let bottom_limit = canvas.page_height() - block.margin - FOOTER_RESERVE;
    let head_style = TextStyle::new(block.font_size).bold().color(Color::WHITE);
    let body_style = TextStyle::new(block.font_size);

    let head = block.prepare(canvas, header, FontWeight::Bold);
    let body: Vec<PreparedRow> = block
        .body
        .iter()
        .map(|cells| block.prepare(canvas, cells, FontWeight::Regular))
        .collect();

    let mut y = block.start_y;
    let first_height = head.height + body.first().map_or(0.0, |r| r.height);
    if y + first_height > bottom_limit && y > block.margin {
        let page = canvas.current_page();
        did_draw_page(canvas, page);
        canvas.add_page();
        y = block.margin;
    }

    block.draw_row(canvas, &head, y, head_style, Some(Color::HEADER));
    y += head.height;
    let mut rows_on_page = 0;

    for (i, row) in body.iter().enumerate() {
        if y + row.height > bottom_limit && rows_on_page > 0 {
            let page = canvas.current_page();
            did_draw_page(canvas, page);
            canvas.add_page();
            y = block.margin;
            block.draw_row(canvas, &head, y, head_style, Some(Color::HEADER));
            y += head.height;
            rows_on_page = 0;
        }

        let fill = (block.striped && i % 2 == 1).then_some(Color::STRIPE);
        block.draw_row(canvas, row, y, body_style, fill);
        y += row.height;
        rows_on_page += 1;
    }

    let page = canvas.current_page();
    did_draw_page(canvas, page);
    tracing::debug!(rows = body.len(), end_page = page, "Drew table");
    Ok(y)
}
