use thiserror::Error;

/// Errors that can occur during table operations
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Row index out of bounds: {index} (table has {count} rows)")]
    RowIndexOutOfBounds { index: usize, count: usize },

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Workbook contains no worksheets")]
    NoWorksheets,

    #[error("Failed to decode spreadsheet: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;
