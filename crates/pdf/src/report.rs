//! Report rendering.
//!
//! A report is a title block (title, generation time, record count), an
//! optional summary statistics table, and the main data table starting on a
//! fresh page. Every page carries a `Page X of Y` footer.

use crate::canvas::{Canvas, Color, TextStyle, TOTAL_PAGES};
use crate::document::PdfCanvas;
use crate::error::Result;
use crate::layout::{
    compute_layout, format_number, summarize, Alignment, ColumnLayout, FontScale, Orientation,
    SummaryRow,
};
use crate::options::ReportOptions;
use crate::table::{draw_table, TableBlock};
use chrono::NaiveDateTime;
use finreport_table::{CellValue, Row, Table, TableView};
use serde::Serialize;

const SUMMARY_HEADERS: [&str; 5] = ["Column", "Sum", "Average", "Max", "Min"];
const FOOTER_FONT_SIZE: f32 = 8.0;
const FOOTER_OFFSET: f32 = 10.0;

/// Rendering progress. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RenderStage {
    Init,
    TitleDrawn,
    SummaryDrawn,
    MainTableDrawn,
    Finalized,
}

#[derive(Debug)]
struct StageLog {
    current: RenderStage,
    visited: Vec<RenderStage>,
}

impl StageLog {
    fn new() -> Self {
        tracing::debug!(stage = ?RenderStage::Init, "Render stage");
        Self {
            current: RenderStage::Init,
            visited: vec![RenderStage::Init],
        }
    }

    fn advance(&mut self, next: RenderStage) {
        debug_assert!(next > self.current, "{:?} -> {:?}", self.current, next);
        tracing::debug!(from = ?self.current, to = ?next, "Render stage");
        self.current = next;
        self.visited.push(next);
    }
}

/// A finished report.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// `<name>.pdf`
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub orientation: Orientation,
    pub summary: Vec<SummaryRow>,
    pub columns: Vec<ColumnLayout>,
    /// Stages passed through, in order
    pub stages: Vec<RenderStage>,
}

/// Renders table views into paginated PDF reports.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    options: ReportOptions,
    generated_at: Option<NaiveDateTime>,
}

impl ReportRenderer {
    pub fn new(options: ReportOptions) -> Self {
        Self {
            options,
            generated_at: None,
        }
    }

    /// Fix the generation timestamp instead of using the current local time
    #[must_use]
    pub fn generated_at(mut self, timestamp: NaiveDateTime) -> Self {
        self.generated_at = Some(timestamp);
        self
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Page width and height for a report with `column_count` columns
    pub fn page_dimensions(&self, column_count: usize) -> (f32, f32) {
        self.options
            .page_size
            .dimensions(Orientation::for_column_count(column_count))
    }

    /// Render the rows of `view` to PDF bytes.
    pub fn render(&self, view: &TableView<'_>, filename: &str) -> Result<RenderedReport> {
        let rows: Vec<&Row> = view.rows().collect();
        let title = self.options.title.clone();
        self.render_with(
            |width, height| PdfCanvas::new(width, height).with_title(title),
            view.headers(),
            &rows,
            filename,
        )
    }

    /// Render onto a canvas built by `new_canvas(page_width, page_height)`.
    ///
    /// Nothing is returned unless every stage, including finishing the
    /// canvas, succeeds.
    pub fn render_with<C, F>(
        &self,
        new_canvas: F,
        headers: &[String],
        rows: &[&Row],
        filename: &str,
    ) -> Result<RenderedReport>
    where
        C: Canvas,
        F: FnOnce(f32, f32) -> C,
    {
        let mut stages = StageLog::new();
        let orientation = Orientation::for_column_count(headers.len());
        let (page_width, page_height) = self.options.page_size.dimensions(orientation);
        let mut canvas = new_canvas(page_width, page_height);
        let fonts = FontScale::for_page_width(page_width);
        let margin = self.options.margin;

        let y = self.draw_title(&mut canvas, fonts, rows.len());
        stages.advance(RenderStage::TitleDrawn);

        let summary = summarize(headers, rows);
        if summary.is_empty() {
            draw_footer(&mut canvas, 1);
        } else {
            draw_summary(&mut canvas, &summary, fonts, margin, y)?;
            stages.advance(RenderStage::SummaryDrawn);
        }

        canvas.add_page();
        let columns = compute_layout(headers, rows, page_width, margin, &canvas, fonts.table);
        let block = TableBlock {
            columns: &columns,
            body: rows
                .iter()
                .map(|row| {
                    headers
                        .iter()
                        .map(|h| row.get(h).map(CellValue::as_text).unwrap_or_default())
                        .collect()
                })
                .collect(),
            font_size: fonts.table,
            margin,
            start_y: margin,
            striped: true,
        };
        draw_table(&mut canvas, &block, headers, &mut draw_footer::<C>)?;
        stages.advance(RenderStage::MainTableDrawn);

        let page_count = canvas.page_count();
        let bytes = canvas.finish()?;
        stages.advance(RenderStage::Finalized);

        let filename = self.options.pdf_filename(filename);
        tracing::info!(
            filename = %filename,
            pages = page_count,
            rows = rows.len(),
            ?orientation,
            "Rendered report"
        );

        Ok(RenderedReport {
            filename,
            bytes,
            page_count,
            orientation,
            summary,
            columns,
            stages: stages.visited,
        })
    }

    /// Returns the y position below the title block
    fn draw_title<C: Canvas>(&self, canvas: &mut C, fonts: FontScale, record_count: usize) -> f32 {
        let margin = self.options.margin;
        let generated_at = self
            .generated_at
            .unwrap_or_else(|| chrono::Local::now().naive_local());

        let mut y = margin + fonts.title;
        canvas.draw_text(&self.options.title, margin, y, TextStyle::new(fonts.title).bold());
        y += fonts.body * 2.0;
        canvas.draw_text(
            &format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
            margin,
            y,
            TextStyle::new(fonts.body),
        );
        y += fonts.body * 1.5;
        canvas.draw_text(
            &format!("Total Records: {record_count}"),
            margin,
            y,
            TextStyle::new(fonts.body),
        );
        y + fonts.body * 2.0
    }
}

fn draw_summary<C: Canvas>(
    canvas: &mut C,
    summary: &[SummaryRow],
    fonts: FontScale,
    margin: f32,
    top: f32,
) -> Result<()> {
    canvas.draw_text(
        "Summary Statistics",
        margin,
        top,
        TextStyle::new(fonts.body).bold(),
    );

    let headers: Vec<String> = SUMMARY_HEADERS.iter().map(ToString::to_string).collect();
    let table = Table::from_rows(
        headers.clone(),
        summary
            .iter()
            .map(|s| {
                vec![
                    s.column.clone(),
                    format_number(s.sum),
                    format_number(s.average),
                    format_number(s.max),
                    format_number(s.min),
                ]
            })
            .collect(),
    );
    let rows: Vec<&Row> = table.rows().iter().collect();
    let mut columns = compute_layout(
        &headers,
        &rows,
        canvas.page_width(),
        margin,
        &*canvas,
        fonts.table,
    );
    // Column names stay left aligned even when they look like numbers
    if let Some(first) = columns.first_mut() {
        first.alignment = Alignment::Left;
    }

    let block = TableBlock {
        columns: &columns,
        body: table
            .rows()
            .iter()
            .map(|row| row.values().map(CellValue::as_text).collect())
            .collect(),
        font_size: fonts.table,
        margin,
        start_y: top + fonts.body * 0.75,
        striped: false,
    };
    draw_table(canvas, &block, &headers, &mut draw_footer::<C>)?;
    Ok(())
}

fn draw_footer<C: Canvas>(canvas: &mut C, page: usize) {
    let x = canvas.page_width() / 2.0;
    let y = canvas.page_height() - FOOTER_OFFSET;
    canvas.draw_text(
        &format!("Page {page} of {TOTAL_PAGES}"),
        x,
        y,
        TextStyle::new(FOOTER_FONT_SIZE)
            .color(Color::MUTED)
            .align(Alignment::Center),
    );
}
