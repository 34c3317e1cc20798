//! Markup module - arena tree of elements and text nodes
//!
//! The extraction engine never matches against individual runs. It projects
//! the full text of a node, walks the tree in document order or sibling order,
//! and serializes contiguous node ranges back into markup. [`MarkupTree`]
//! provides exactly those operations over an index-addressed arena.
//!
//! Node identity is a [`NodeId`] issued by the tree. Ids are handed out in
//! creation order, so for a tree built by appending (as
//! [`MarkupTree::from_document`] does) id order equals document order.

use crate::document::{Run, StructuredDocument};
use std::fmt;

/// Identity of a node inside the [`MarkupTree`] that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic document root
    Root,

    /// An element with its tag and attributes in source order
    Element {
        /// Lowercase tag name
        tag: String,
        /// Attribute name/value pairs
        attrs: Vec<(String, String)>,
    },

    /// A text leaf (unescaped)
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed markup tree
#[derive(Debug, Clone)]
pub struct MarkupTree {
    nodes: Vec<Node>,
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupTree {
    /// Create a tree holding only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Render a structured document
    ///
    /// Each block becomes an element named after its block kind, separated from
    /// the previous block by a `"\n"` text node. Each run's text is wrapped
    /// innermost-first in `strong`, `em`, `u`, `mark`, `span` (color) and `a`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardcut_domain::{Block, MarkupTree, Run, RunStyle, StructuredDocument};
    ///
    /// let bold = RunStyle { bold: true, ..Default::default() };
    /// let doc = StructuredDocument::new(vec![Block::paragraph(vec![
    ///     Run::styled("Alice '20", bold),
    ///     Run::plain(" argues X & Y."),
    /// ])]);
    ///
    /// let tree = MarkupTree::from_document(&doc);
    /// assert_eq!(tree.to_markup(), "<p><strong>Alice '20</strong> argues X &amp; Y.</p>");
    /// ```
    pub fn from_document(document: &StructuredDocument) -> Self {
        let mut tree = Self::new();
        let root = tree.root();

        for (idx, block) in document.blocks().iter().enumerate() {
            if idx > 0 {
                tree.append_text(root, "\n");
            }
            let block_node = tree.append_element(root, block.kind.tag(), Vec::new());
            for run in &block.runs {
                tree.append_run(block_node, run);
            }
        }

        tree
    }

    fn append_run(&mut self, parent: NodeId, run: &Run) {
        if run.text.is_empty() {
            return;
        }

        let style = &run.style;
        if style.is_plain() {
            self.append_text(parent, run.text.clone());
            return;
        }

        let mut wrappers: Vec<(&str, Vec<(String, String)>)> = Vec::new();
        if let Some(href) = &style.hyperlink {
            wrappers.push(("a", vec![("href".to_string(), href.clone())]));
        }
        if let Some(color) = style.color {
            wrappers.push(("span", vec![("style".to_string(), format!("color: {};", color))]));
        }
        if let Some(highlight) = &style.highlight {
            wrappers.push((
                "mark",
                vec![("style".to_string(), format!("background-color: {};", highlight))],
            ));
        }
        if style.underline {
            wrappers.push(("u", Vec::new()));
        }
        if style.italic {
            wrappers.push(("em", Vec::new()));
        }
        if style.bold {
            wrappers.push(("strong", Vec::new()));
        }

        let mut current = parent;
        for (tag, attrs) in wrappers {
            current = self.append_element(current, tag, attrs);
        }
        self.append_text(current, run.text.clone());
    }

    /// The root node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever allocated, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Kind of a node
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Tag name if the node is an element
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Value of an attribute if the node is an element carrying it
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// True for text leaves
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    /// True for elements
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    /// Parent of a node; `None` for the root and for detached nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children in order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Append a new element under `parent`
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: impl Into<String>,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        self.push(
            parent,
            NodeKind::Element {
                tag: tag.into(),
                attrs,
            },
        )
    }

    /// Append a new text leaf under `parent`
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push(parent, NodeKind::Text(text.into()))
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        debug_assert!(!self.is_text(parent), "text nodes cannot have children");
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Following sibling, text nodes included
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Preceding siblings, nearest first
    pub fn previous_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&c| c == id) {
            Some(pos) => siblings[..pos].iter().rev().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Next node in a depth-first linear walk of the whole tree
    ///
    /// Descends into the first child when there is one, otherwise moves to the
    /// next sibling of the nearest ancestor-or-self that has one.
    pub fn next_in_order(&self, id: NodeId) -> Option<NodeId> {
        if let Some(&first) = self.children(id).first() {
            return Some(first);
        }
        let mut current = id;
        loop {
            if let Some(next) = self.next_sibling(current) {
                return Some(next);
            }
            current = self.parent(current)?;
        }
    }

    /// Pre-order walk of `id` and everything below it
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Attached elements in document order
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(self.root()).filter(|&id| self.is_element(id))
    }

    /// Flattened text of a node and all its descendants
    pub fn text(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| match self.kind(n) {
                NodeKind::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text leaves joined with `separator`, trimmed
    pub fn text_with_separator(&self, id: NodeId, separator: &str) -> String {
        let parts: Vec<&str> = self
            .descendants(id)
            .filter_map(|n| match self.kind(n) {
                NodeKind::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        parts.join(separator).trim().to_string()
    }

    /// Plain-text projection of the whole tree
    pub fn plain_text(&self) -> String {
        self.text(self.root())
    }

    /// Detach a node (and its subtree) from its parent
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Replace the content of a node with a single text leaf
    ///
    /// For a text node the text is replaced in place; for an element all
    /// children are detached first, so inline formatting below it is lost.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let NodeKind::Text(existing) = &mut self.nodes[id.0].kind {
            *existing = text.into();
            return;
        }
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        self.append_text(id, text);
    }

    /// Deep-copy the subtree at `id` under `dest_parent` in another tree
    ///
    /// Copying the root copies its children directly under `dest_parent`.
    pub fn copy_subtree(&self, id: NodeId, dest: &mut MarkupTree, dest_parent: NodeId) -> NodeId {
        if let NodeKind::Root = self.kind(id) {
            for &child in self.children(id) {
                self.copy_subtree(child, dest, dest_parent);
            }
            return dest_parent;
        }
        let copied = dest.push(dest_parent, self.kind(id).clone());
        for &child in self.children(id) {
            self.copy_subtree(child, dest, copied);
        }
        copied
    }

    /// Serialized markup of a node, the node's own tags included
    pub fn serialize(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialized markup of a node's children only
    pub fn serialize_children(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialized markup of the whole tree
    pub fn to_markup(&self) -> String {
        self.serialize(self.root())
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Root => {
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Pre-order iterator returned by [`MarkupTree::descendants`]
pub struct Descendants<'a> {
    tree: &'a MarkupTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Escape text content for markup
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for a double-quoted attribute
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Rgb, RunStyle};
    use proptest::prelude::*;

    fn sample_tree() -> MarkupTree {
        StructuredDocument::from_paragraphs(["Alice '20 argues X.", "This continues.", "Bob '19 claims Y."])
            .to_markup_tree()
    }

    #[test]
    fn test_from_document_layout() {
        let tree = sample_tree();
        let root = tree.root();
        // three blocks plus two separators
        assert_eq!(tree.children(root).len(), 5);
        assert_eq!(
            tree.to_markup(),
            "<p>Alice '20 argues X.</p>\n<p>This continues.</p>\n<p>Bob '19 claims Y.</p>"
        );
        assert_eq!(tree.plain_text(), "Alice '20 argues X.\nThis continues.\nBob '19 claims Y.");
    }

    #[test]
    fn test_run_wrapping_order() {
        let style = RunStyle {
            bold: true,
            italic: true,
            underline: true,
            highlight: Some("yellow".to_string()),
            color: Some(Rgb(255, 0, 0)),
            hyperlink: Some("https://example.com/a?b=1&c=2".to_string()),
        };
        let doc = StructuredDocument::new(vec![Block::paragraph(vec![Run::styled("t", style)])]);
        assert_eq!(
            doc.to_markup_tree().to_markup(),
            "<p><a href=\"https://example.com/a?b=1&amp;c=2\">\
             <span style=\"color: rgb(255,0,0);\">\
             <mark style=\"background-color: yellow;\">\
             <u><em><strong>t</strong></em></u></mark></span></a></p>"
        );
    }

    #[test]
    fn test_empty_runs_are_skipped() {
        let doc = StructuredDocument::new(vec![Block::paragraph(vec![
            Run::plain(""),
            Run::plain("x"),
        ])]);
        assert_eq!(doc.to_markup_tree().to_markup(), "<p>x</p>");
    }

    #[test]
    fn test_sibling_navigation() {
        let tree = sample_tree();
        let blocks: Vec<NodeId> = tree.elements().collect();
        assert_eq!(blocks.len(), 3);

        let separator = tree.next_sibling(blocks[0]).unwrap();
        assert!(tree.is_text(separator));
        assert_eq!(tree.next_sibling(separator), Some(blocks[1]));
        assert_eq!(tree.next_sibling(tree.root()), None);

        let previous = tree.previous_siblings(blocks[2]);
        assert_eq!(previous.len(), 4);
        assert_eq!(previous[3], blocks[0]);
    }

    #[test]
    fn test_next_in_order_walks_whole_tree() {
        let tree = sample_tree();
        let mut visited = Vec::new();
        let mut current = Some(tree.root());
        while let Some(id) = current {
            visited.push(id);
            current = tree.next_in_order(id);
        }
        let preorder: Vec<NodeId> = tree.descendants(tree.root()).collect();
        assert_eq!(visited, preorder);
        assert_eq!(visited.len(), tree.len());
    }

    #[test]
    fn test_text_with_separator() {
        let bold = RunStyle { bold: true, ..Default::default() };
        let doc = StructuredDocument::new(vec![Block::paragraph(vec![
            Run::styled("Alice", bold),
            Run::plain("argues"),
        ])]);
        let tree = doc.to_markup_tree();
        assert_eq!(tree.text(tree.root()), "Aliceargues");
        assert_eq!(tree.text_with_separator(tree.root(), " "), "Alice argues");
    }

    #[test]
    fn test_detach_and_set_text() {
        let mut tree = sample_tree();
        let blocks: Vec<NodeId> = tree.elements().collect();

        tree.detach(blocks[0]);
        assert_eq!(tree.parent(blocks[0]), None);
        assert!(!tree.to_markup().contains("Alice"));

        tree.set_text(blocks[1], "Replaced");
        assert_eq!(tree.serialize(blocks[1]), "<p>Replaced</p>");

        let leaf = tree.children(blocks[2])[0];
        tree.set_text(leaf, "Leaf");
        assert_eq!(tree.serialize(blocks[2]), "<p>Leaf</p>");
    }

    #[test]
    fn test_copy_subtree() {
        let tree = sample_tree();
        let blocks: Vec<NodeId> = tree.elements().collect();

        let mut copy = MarkupTree::new();
        let root = copy.root();
        tree.copy_subtree(blocks[1], &mut copy, root);
        assert_eq!(copy.to_markup(), "<p>This continues.</p>");

        let mut whole = MarkupTree::new();
        let whole_root = whole.root();
        tree.copy_subtree(tree.root(), &mut whole, whole_root);
        assert_eq!(whole.to_markup(), tree.to_markup());
    }

    #[test]
    fn test_attr_lookup() {
        let mut tree = MarkupTree::new();
        let root = tree.root();
        let link = tree.append_element(root, "a", vec![("href".into(), "https://x.org".into())]);
        assert_eq!(tree.attr(link, "href"), Some("https://x.org"));
        assert_eq!(tree.attr(link, "title"), None);
        assert_eq!(tree.tag(link), Some("a"));
    }

    proptest! {
        #[test]
        fn prop_escaped_text_has_no_raw_markup(text in ".*") {
            let escaped = escape_text(&text);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            let restored = escaped
                .replace("&lt;", "<")
                .replace("&gt;", ">")
                .replace("&amp;", "&");
            prop_assert_eq!(restored, text);
        }
    }
}
