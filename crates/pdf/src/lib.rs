//! PDF report rendering for finreport.
//!
//! Turns a filtered and sorted [`TableView`](finreport_table::TableView) into
//! a paginated PDF: a title block, summary statistics for numeric columns and
//! the full data table with a page footer on every page.
//!
//! ```no_run
//! use finreport_pdf::{ReportOptions, ReportRenderer};
//! use finreport_table::Table;
//!
//! let table = Table::from_rows(vec!["item", "amount"], vec![vec!["Coffee", "3.50"]]);
//! let report = ReportRenderer::new(ReportOptions::default())
//!     .render(&table.view(), "coffee")
//!     .unwrap();
//! std::fs::write(&report.filename, &report.bytes).unwrap();
//! ```

pub mod canvas;
mod document;
mod error;
pub mod layout;
pub mod metrics;
mod options;
mod report;
pub mod table;

pub use canvas::{Canvas, Color, Rect, TextStyle, TOTAL_PAGES};
pub use document::PdfCanvas;
pub use error::{PdfError, Result};
pub use layout::{
    compute_layout, format_number, summarize, Alignment, ColumnLayout, FontScale, Orientation,
    SummaryRow,
};
pub use metrics::{FontWeight, Helvetica, TextMetrics};
pub use options::{PageSize, ReportOptions, DEFAULT_OUTPUT_NAME};
pub use report::{RenderStage, RenderedReport, ReportRenderer};
