//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction engine and its
//! collaborators. Implementations live in other crates.

use crate::{Card, CardMetadata, StructuredDocument};
use std::path::Path;

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (cardcut-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Trait for turning a source file into a formatted document tree
///
/// Implemented by the ingestion layer (cardcut-ingest)
pub trait TreeBuilder {
    /// Error type for tree building
    type Error;

    /// Whether this builder recognizes the file (by extension)
    fn supports(&self, path: &Path) -> bool;

    /// Build the structured document for a file
    fn build_tree(&self, path: &Path) -> Result<StructuredDocument, Self::Error>;
}

/// Trait for persisting or submitting extracted cards
///
/// Implemented by the application layer (cardcut-cli)
pub trait CardSink {
    /// Error type for sink operations
    type Error;

    /// Receive one card; `index` is the card's zero-based position in its document
    fn write_card(&mut self, index: usize, card: &Card) -> Result<(), Self::Error>;

    /// Receive the `{author, url}` listing for all cards of a document, in card order
    fn write_metadata(&mut self, entries: &[CardMetadata]) -> Result<(), Self::Error>;
}
