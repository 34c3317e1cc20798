//! Fragment Cleaner
//!
//! Two narrow repairs applied once to each materialized fragment:
//!
//! 1. Leading noise: everything before the element holding the first author
//!    mention is tail end of the previous card, swept in because the sibling
//!    walk starts inclusively. Those preceding siblings are removed.
//! 2. Duplicate author: when the start anchor's run-up repeats the author
//!    token ("Alice '20 Alice '20 argues ..."), the element's text is rebuilt
//!    as the author followed by everything after the second occurrence.
//!
//! The second repair targets that one artifact only. It is not a general
//! deduplication pass, and it flattens inline formatting of the element it
//! rewrites.

use crate::types::Fragment;
use cardcut_domain::{MarkupTree, NodeId, NodeKind};
use tracing::debug;

/// What the cleaner changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanOutcome {
    /// Preceding siblings removed
    pub removed_preceding: usize,

    /// The duplicate author mention was collapsed
    pub collapsed_duplicate: bool,
}

/// Clean a fragment in place
pub fn clean(fragment: &mut Fragment) -> CleanOutcome {
    let author = fragment.author.clone();
    let tree = &mut fragment.tree;
    let mut outcome = CleanOutcome::default();

    let Some(text_node) = first_text_containing(tree, &author) else {
        debug!("Author '{}' not found in any single text node; fragment left as is", author);
        return outcome;
    };
    let Some(container) = tree.parent(text_node).filter(|&p| p != tree.root()) else {
        return outcome;
    };

    for sibling in tree.previous_siblings(container) {
        tree.detach(sibling);
        outcome.removed_preceding += 1;
    }

    let text = tree.text(container);
    let pieces: Vec<&str> = text.split(author.as_str()).collect();
    if pieces.len() > 2 {
        let repaired = format!("{}{}", author, pieces[2..].concat());
        tree.set_text(container, repaired);
        outcome.collapsed_duplicate = true;
    }

    debug!(
        "Cleaned '{}': removed {} preceding nodes, collapsed duplicate: {}",
        author, outcome.removed_preceding, outcome.collapsed_duplicate
    );
    outcome
}

/// First text leaf, in document order, containing `needle` verbatim
fn first_text_containing(tree: &MarkupTree, needle: &str) -> Option<NodeId> {
    tree.descendants(tree.root())
        .find(|&id| matches!(tree.kind(id), NodeKind::Text(t) if t.contains(needle)))
}
