//! Document module - the block/run tree produced by a formatted tree builder

use crate::markup::MarkupTree;
use std::fmt;

/// RGB text color of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse a six digit hex color such as `"FF0000"` (a leading `#` is accepted)
    ///
    /// # Examples
    ///
    /// ```
    /// use cardcut_domain::Rgb;
    ///
    /// assert_eq!(Rgb::from_hex("00ff7f"), Some(Rgb(0, 255, 127)));
    /// assert_eq!(Rgb::from_hex("auto"), None);
    /// ```
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.0, self.1, self.2)
    }
}

/// Style record of a run
///
/// A run never mixes two style combinations; a style change always starts a new run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Highlight color name (e.g. "yellow")
    pub highlight: Option<String>,

    /// Explicit text color
    pub color: Option<Rgb>,

    /// Hyperlink target
    pub hyperlink: Option<String>,
}

impl RunStyle {
    /// True when the style carries no formatting at all
    pub fn is_plain(&self) -> bool {
        *self == RunStyle::default()
    }
}

/// A leaf of the formatted tree: raw text plus one style combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Raw, unescaped text
    pub text: String,

    /// Formatting applied to the whole run
    pub style: RunStyle,
}

impl Run {
    /// Create an unformatted run
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    /// Create a run with the given style
    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Block-level tag of a block node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Ordinary paragraph (`p`)
    Paragraph,
    /// Heading of level 1-6 (`h1`..`h6`)
    Heading(u8),
    /// List item (`li`)
    ListItem,
    /// Generic division (`div`)
    Division,
}

impl BlockKind {
    /// Markup tag used when rendering the block
    pub fn tag(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading(1) => "h1",
            BlockKind::Heading(2) => "h2",
            BlockKind::Heading(3) => "h3",
            BlockKind::Heading(4) => "h4",
            BlockKind::Heading(5) => "h5",
            BlockKind::Heading(_) => "h6",
            BlockKind::ListItem => "li",
            BlockKind::Division => "div",
        }
    }

    /// Parse a block kind from a markup tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "p" => Some(BlockKind::Paragraph),
            "h1" => Some(BlockKind::Heading(1)),
            "h2" => Some(BlockKind::Heading(2)),
            "h3" => Some(BlockKind::Heading(3)),
            "h4" => Some(BlockKind::Heading(4)),
            "h5" => Some(BlockKind::Heading(5)),
            "h6" => Some(BlockKind::Heading(6)),
            "li" => Some(BlockKind::ListItem),
            "div" => Some(BlockKind::Division),
            _ => None,
        }
    }
}

/// An ordered sequence of runs plus a block-level tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block-level tag
    pub kind: BlockKind,

    /// Runs in reading order
    pub runs: Vec<Run>,
}

impl Block {
    /// Create a paragraph block from runs
    pub fn paragraph(runs: Vec<Run>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            runs,
        }
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// True when no run carries any non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

/// The formatted tree of one source document
///
/// Immutable once built; owned by the pipeline run that created it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredDocument {
    blocks: Vec<Block>,
    source: Option<String>,
}

impl StructuredDocument {
    /// Create a document from blocks
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            source: None,
        }
    }

    /// Build a document of unformatted paragraphs, one per string
    ///
    /// # Examples
    ///
    /// ```
    /// use cardcut_domain::StructuredDocument;
    ///
    /// let doc = StructuredDocument::from_paragraphs(["Alice '20 argues X.", "This continues."]);
    /// assert_eq!(doc.blocks().len(), 2);
    /// assert_eq!(doc.plain_text(), "Alice '20 argues X.\nThis continues.");
    /// ```
    pub fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            paragraphs
                .into_iter()
                .map(|text| Block::paragraph(vec![Run::plain(text)]))
                .collect(),
        )
    }

    /// Attach the path or name of the source this document was built from
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Blocks in document order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Source identifier, if known
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// True when the document has no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total number of runs across all blocks
    pub fn run_count(&self) -> usize {
        self.blocks.iter().map(|b| b.runs.len()).sum()
    }

    /// Render the document into a node-addressable markup tree
    pub fn to_markup_tree(&self) -> MarkupTree {
        MarkupTree::from_document(self)
    }

    /// Plain-text projection: block texts separated by newlines
    pub fn plain_text(&self) -> String {
        self.to_markup_tree().plain_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex("#102030"), Some(Rgb(16, 32, 48)));
        assert_eq!(Rgb::from_hex("12345"), None);
        assert_eq!(Rgb::from_hex("zzzzzz"), None);
        assert_eq!(Rgb(1, 2, 3).to_string(), "rgb(1,2,3)");
    }

    #[test]
    fn test_block_kind_tags_round_trip() {
        for kind in [
            BlockKind::Paragraph,
            BlockKind::Heading(2),
            BlockKind::ListItem,
            BlockKind::Division,
        ] {
            assert_eq!(BlockKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(BlockKind::from_tag("span"), None);
    }

    #[test]
    fn test_block_text_concatenates_runs() {
        let block = Block::paragraph(vec![
            Run::styled("Alice ", RunStyle { bold: true, ..Default::default() }),
            Run::plain("'20 argues"),
        ]);
        assert_eq!(block.text(), "Alice '20 argues");
        assert!(!block.is_blank());
        assert!(!block.runs[0].style.is_plain());
        assert!(block.runs[1].style.is_plain());
    }

    #[test]
    fn test_document_counts() {
        let doc = StructuredDocument::from_paragraphs(["a", "b", "c"]).with_source("memo.docx");
        assert_eq!(doc.run_count(), 3);
        assert_eq!(doc.source(), Some("memo.docx"));
        assert!(!doc.is_empty());
        assert!(StructuredDocument::default().is_empty());
    }
}
