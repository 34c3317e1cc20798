//! Cardcut Domain Layer
//!
//! This crate contains the domain model for Cardcut: the formatted document
//! tree handed over by a tree builder, the arena markup tree that the
//! extraction engine walks, and the card types produced at the end of the
//! pipeline. It has ZERO external dependencies and defines the trait seams
//! that infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **StructuredDocument**: Ordered blocks of styled runs, immutable once built
//! - **MarkupTree**: Node-addressable rendering of a document with traversal and serialization
//! - **BoundaryDescriptor**: Untrusted `{author, start_text, end_text}` hint from the oracle
//! - **Card**: One extracted, attributed passage with its markup and plain text
//!
//! ## Architecture
//!
//! - No external crate dependencies
//! - Pure data structures and tree algorithms only
//! - Trait definitions for the oracle, tree builders and persistence

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod card;
pub mod document;
pub mod markup;
pub mod traits;

// Re-exports for convenience
pub use card::{BoundaryDescriptor, Card, CardMetadata};
pub use document::{Block, BlockKind, Rgb, Run, RunStyle, StructuredDocument};
pub use markup::{MarkupTree, NodeId, NodeKind};
