use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to encode page content: {0}")]
    EncodeError(String),

    #[error("Failed to write PDF document: {0}")]
    WriteError(String),

    #[error("Canvas has no pages to finalize")]
    EmptyDocument,
}

pub type Result<T> = std::result::Result<T, PdfError>;
