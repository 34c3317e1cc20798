//! Request and result types for extraction

use cardcut_domain::{Card, CardMetadata, MarkupTree, NodeId};
use serde::Serialize;
use std::fmt;

/// Resolved extent of one card in the rendered document
///
/// `start` precedes or equals `end` in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start anchor node
    pub start: NodeId,

    /// End anchor node
    pub end: NodeId,
}

/// Materialized markup for one span
///
/// Created by the materializer, mutated once by the cleaner, then frozen
/// into a [`Card`].
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Author token of the originating descriptor
    pub author: String,

    /// First source URL in the materialized markup, empty when absent
    pub url: String,

    /// Copied nodes, each a direct child of the fragment root
    pub tree: MarkupTree,

    /// Nodes of the source tree that were copied, in walk order
    pub source_nodes: Vec<NodeId>,

    /// The sibling walk ran out before meeting the end anchor
    pub truncated: bool,
}

impl Fragment {
    /// Serialized markup of the fragment
    pub fn markup(&self) -> String {
        self.tree.serialize_children(self.tree.root())
    }

    /// Text leaves joined by single spaces, trimmed
    pub fn text(&self) -> String {
        self.tree.text_with_separator(self.tree.root(), " ")
    }
}

/// Why a descriptor produced no card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No anchor-eligible node matched the start phrase
    StartNotFound,

    /// Nothing after the start anchor matched the end phrase
    EndNotFound,

    /// The cleaned fragment carried no text
    EmptyFragment,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::StartNotFound => "start not found",
            FailureReason::EndNotFound => "end not found",
            FailureReason::EmptyFragment => "empty fragment",
        };
        f.write_str(s)
    }
}

/// A descriptor that was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorFailure {
    /// Author token of the dropped descriptor
    pub author: String,

    /// Reason it was dropped
    pub reason: FailureReason,
}

/// How the boundary oracle exchange ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleOutcome {
    /// A list of descriptors was parsed (possibly empty)
    Parsed,

    /// Every attempt returned output without a list of objects
    Unparsable,

    /// The last attempt failed or timed out
    Unavailable,

    /// Descriptors were supplied directly
    NotConsulted,
}

/// Metadata about the extraction
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    /// Source path of the document, if known
    pub source: Option<String>,

    /// Valid descriptors handed to the locator
    pub descriptors_received: usize,

    /// Oracle calls made, retries included
    pub oracle_attempts: u32,

    /// How the oracle exchange ended
    pub oracle_outcome: OracleOutcome,

    /// Cards whose sibling walk was cut short
    pub truncated_fragments: usize,

    /// Wall-clock time spent (milliseconds)
    pub processing_time_ms: u64,
}

/// Result of extracting one document
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Cards in descriptor order
    pub cards: Vec<Card>,

    /// Descriptors that produced no card
    pub failures: Vec<DescriptorFailure>,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// `{author, url}` entries in card order
    pub fn metadata_entries(&self) -> Vec<CardMetadata> {
        self.cards.iter().map(Card::metadata).collect()
    }
}
