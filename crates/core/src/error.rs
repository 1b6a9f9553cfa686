//! Error types for report sessions.

use finreport_pdf::PdfError;
use finreport_table::TableError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by [`Session`](crate::Session) operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The file name does not end in `.xlsx` or `.xls`.
    #[error("Invalid file type: {name}")]
    InvalidFileType { name: String },

    /// The spreadsheet could not be read.
    #[error("Failed to read spreadsheet: {0}")]
    DecodeFailure(#[source] TableError),

    /// The report could not be rendered.
    #[error("Failed to render report: {0}")]
    RenderFailure(#[from] PdfError),

    /// Another upload or generation is still running.
    #[error("Another operation is already in progress")]
    Busy,

    /// Nothing has been uploaded yet.
    #[error("No spreadsheet loaded")]
    NoData,

    /// Table edit or lookup error.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Background task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O error while writing the report.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
