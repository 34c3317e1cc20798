//! Error types for document ingestion

use thiserror::Error;

/// Errors that can occur while building a document tree
#[derive(Error, Debug)]
pub enum IngestError {
    /// The file is neither a recognized word-processor format nor convertible
    /// from a recognized page-layout format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Reading the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The word-processor package could not be parsed
    #[error("DOCX parse error: {0}")]
    Docx(String),

    /// The page-layout file could not be parsed
    #[error("PDF parse error: {0}")]
    Pdf(String),

    /// Markup input could not be turned into blocks
    #[error("Markup error: {0}")]
    Markup(String),
}
