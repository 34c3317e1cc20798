//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Document could not be turned into a tree
    #[error("Ingest error: {0}")]
    Ingest(#[from] cardcut_ingest::IngestError),

    /// Extractor setup error
    #[error("Extractor error: {0}")]
    Extractor(#[from] cardcut_extractor::ExtractorError),

    /// Oracle provider setup error
    #[error("LLM error: {0}")]
    Llm(#[from] cardcut_llm::LlmError),

    /// Submission endpoint error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
