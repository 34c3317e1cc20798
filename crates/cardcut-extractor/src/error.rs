//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// None of these escape [`crate::CardExtractor::extract`]: oracle failures are
/// retried and then recovered as zero descriptors. They surface from the
/// oracle client itself and from configuration.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The boundary oracle could not be reached or failed
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Oracle call exceeded its time budget
    #[error("Oracle timeout")]
    Timeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
