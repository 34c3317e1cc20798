//! Page-layout (.pdf) tree builder
//!
//! A PDF carries positioned glyphs rather than styled paragraphs, so only the
//! text survives: every non-empty extracted line becomes a paragraph of one
//! plain run, in page order.

use crate::error::IngestError;
use cardcut_domain::traits::TreeBuilder;
use cardcut_domain::{Block, Run, StructuredDocument};
use lopdf::Document;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Builds a [`StructuredDocument`] from the text layer of a `.pdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTreeBuilder;

impl PdfTreeBuilder {
    /// Create a builder
    pub fn new() -> Self {
        Self
    }

    /// Build from the raw bytes of a PDF file
    pub fn build_from_bytes(&self, bytes: &[u8]) -> Result<StructuredDocument, IngestError> {
        let doc = Document::load_mem(bytes).map_err(|e| IngestError::Pdf(e.to_string()))?;

        let mut blocks = Vec::new();
        for (page_number, _) in doc.get_pages() {
            match doc.extract_text(&[page_number]) {
                Ok(text) => blocks.extend(paragraphs(&text)),
                Err(e) => warn!("No text layer on page {}: {}", page_number, e),
            }
        }

        if blocks.is_empty() {
            warn!("PDF has no extractable text; scanned pages need OCR first");
        }
        debug!("Built {} paragraphs from pdf", blocks.len());
        Ok(StructuredDocument::new(blocks))
    }
}

impl TreeBuilder for PdfTreeBuilder {
    type Error = IngestError;

    fn supports(&self, path: &Path) -> bool {
        crate::extension_of(path).as_deref() == Some("pdf")
    }

    fn build_tree(&self, path: &Path) -> Result<StructuredDocument, IngestError> {
        let bytes = fs::read(path)?;
        Ok(self
            .build_from_bytes(&bytes)?
            .with_source(path.display().to_string()))
    }
}

/// One plain paragraph per non-blank line, inner whitespace collapsed
fn paragraphs(page_text: &str) -> impl Iterator<Item = Block> + '_ {
    page_text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .map(|line| Block::paragraph(vec![Run::plain(line)]))
}
