//! Span Materializer
//!
//! Copies the sibling range of a span into a standalone fragment tree.

use crate::entities::unescape_entities;
use crate::types::{Fragment, Span};
use cardcut_domain::MarkupTree;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// `http`/`https` URL, stopping at whitespace, quotes and angle brackets
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("valid url pattern"));

/// First URL in a markup string, entity-decoded, empty when there is none
pub fn extract_url(markup: &str) -> String {
    URL_PATTERN
        .find(markup)
        .map(|m| unescape_entities(m.as_str()))
        .unwrap_or_default()
}

/// Materialize a span
///
/// Walks sibling order from `span.start`, copying each node, and stops at
/// `span.end`. When the siblings run out first the fragment keeps what was
/// collected and is flagged `truncated`.
pub fn materialize(tree: &MarkupTree, span: Span, author: &str) -> Fragment {
    let mut fragment_tree = MarkupTree::new();
    let fragment_root = fragment_tree.root();
    let mut source_nodes = Vec::new();
    let mut truncated = true;

    let mut current = Some(span.start);
    while let Some(id) = current {
        tree.copy_subtree(id, &mut fragment_tree, fragment_root);
        source_nodes.push(id);
        if id == span.end {
            truncated = false;
            break;
        }
        current = tree.next_sibling(id);
    }

    if truncated {
        warn!(
            "Sibling walk for '{}' ended before reaching {}; keeping {} nodes",
            author,
            span.end,
            source_nodes.len()
        );
    }

    let url = extract_url(&fragment_tree.serialize_children(fragment_root));

    Fragment {
        author: author.to_string(),
        url,
        tree: fragment_tree,
        source_nodes,
        truncated,
    }
}
