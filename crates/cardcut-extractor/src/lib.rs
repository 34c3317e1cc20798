//! Cardcut Extractor
//!
//! Locates evidence cards inside a structured document and materializes each
//! one as a standalone, cleaned markup fragment.
//!
//! # Architecture
//!
//! ```text
//! StructuredDocument → plain text → Oracle → Validator → descriptors
//!                    → markup tree ─────────────────────┐
//!   descriptor → Locator → Span → Materializer → Fragment → Cleaner → Card
//! ```
//!
//! The oracle proposes approximate `{author, start, end}` boundaries. Nothing
//! it says is trusted: responses pass a schema gate, boundary phrases are
//! matched by word containment against whole-node text, and every descriptor
//! that cannot be resolved is dropped without affecting the others.
//!
//! # Example Usage
//!
//! ```no_run
//! use cardcut_extractor::{BoundaryOracle, CardExtractor, ExtractorConfig};
//! use cardcut_domain::StructuredDocument;
//! use cardcut_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let oracle = BoundaryOracle::new(MockProvider::new(
//!     r#"[{"author": "Alice '20", "start": "Alice '20 argues X", "end": "continues"}]"#,
//! ));
//! let extractor = CardExtractor::new(ExtractorConfig::default())?;
//!
//! let document = StructuredDocument::from_paragraphs(["Alice '20 argues X.", "This continues."]);
//! let result = extractor.extract(&oracle, &document).await;
//!
//! println!("Cards: {}", result.cards.len());
//! println!("Dropped: {}", result.failures.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cleaner;
mod config;
mod entities;
mod error;
mod extractor;
mod locator;
mod materializer;
mod matching;
mod oracle;
mod prompt;
mod retry;
mod types;
mod validator;

#[cfg(test)]
mod tests;

pub use cleaner::{clean, CleanOutcome};
pub use config::ExtractorConfig;
pub use entities::unescape_entities;
pub use error::ExtractorError;
pub use extractor::CardExtractor;
pub use locator::SpanLocator;
pub use materializer::{extract_url, materialize};
pub use matching::flexible_match;
pub use oracle::BoundaryOracle;
pub use prompt::PromptBuilder;
pub use retry::{Backoff, FixedBackoff, RetryPolicy};
pub use types::{
    DescriptorFailure, ExtractionMetadata, ExtractionResult, FailureReason, Fragment,
    OracleOutcome, Span,
};
pub use validator::{validate_entries, validate_response, ValidatedBoundaries};
