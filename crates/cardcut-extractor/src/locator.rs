//! Span Locator
//!
//! Maps a boundary descriptor onto a pair of nodes in the rendered document.
//! Matching always runs against a node's full flattened text, never against a
//! single style run, since one phrase is usually spread over several runs.

use crate::matching::flexible_match;
use crate::types::{FailureReason, Span};
use cardcut_domain::{MarkupTree, NodeId};
use tracing::debug;

/// Finds start and end anchors for boundary phrases
pub struct SpanLocator<'a> {
    tree: &'a MarkupTree,
    anchor_tags: &'a [String],
    threshold: f64,
}

impl<'a> SpanLocator<'a> {
    /// Create a locator over a rendered document
    pub fn new(tree: &'a MarkupTree, anchor_tags: &'a [String], threshold: f64) -> Self {
        Self {
            tree,
            anchor_tags,
            threshold,
        }
    }

    /// Resolve both anchors
    pub fn locate(&self, start_text: &str, end_text: &str) -> Result<Span, FailureReason> {
        let start = self
            .find_start(start_text)
            .ok_or(FailureReason::StartNotFound)?;
        let end = self
            .find_end(start, end_text)
            .ok_or(FailureReason::EndNotFound)?;

        debug!("Located span {}..={}", start, end);
        Ok(Span { start, end })
    }

    /// First anchor-eligible element, in document order, matching `start_text`
    pub fn find_start(&self, start_text: &str) -> Option<NodeId> {
        self.tree.elements().find(|&id| {
            self.is_anchor(id) && flexible_match(start_text, &self.tree.text(id), self.threshold)
        })
    }

    /// First node matching `end_text` in a linear walk from `start`, inclusive
    ///
    /// The walk descends into children and climbs back out, so the end anchor
    /// may sit at any depth.
    pub fn find_end(&self, start: NodeId, end_text: &str) -> Option<NodeId> {
        let mut current = Some(start);
        while let Some(id) = current {
            if flexible_match(end_text, &self.tree.text(id), self.threshold) {
                return Some(id);
            }
            current = self.tree.next_in_order(id);
        }
        None
    }

    fn is_anchor(&self, id: NodeId) -> bool {
        self.tree
            .tag(id)
            .is_some_and(|tag| self.anchor_tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }
}
