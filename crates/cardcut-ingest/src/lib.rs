//! Cardcut Ingest
//!
//! Formatted tree builders: turn a source file into a [`StructuredDocument`]
//! of blocks and styled runs.
//!
//! # Supported inputs
//!
//! - `.docx` word-processor packages ([`DocxTreeBuilder`])
//! - `.html`/`.htm` markup previously rendered from a document ([`HtmlTreeBuilder`])
//! - `.pdf` page-layout files, text layer only ([`PdfTreeBuilder`])
//!
//! Anything else fails with [`IngestError::UnsupportedFormat`].
//!
//! # Example Usage
//!
//! ```no_run
//! use cardcut_ingest::FileTreeBuilder;
//! use cardcut_domain::traits::TreeBuilder;
//! use std::path::Path;
//!
//! let builder = FileTreeBuilder::new();
//! let document = builder.build_tree(Path::new("evidence/file.docx"))?;
//! println!("{} blocks", document.blocks().len());
//! # Ok::<(), cardcut_ingest::IngestError>(())
//! ```

#![warn(missing_docs)]

mod docx;
mod error;
mod html;
mod pdf;

pub use docx::DocxTreeBuilder;
pub use error::IngestError;
pub use html::HtmlTreeBuilder;
pub use pdf::PdfTreeBuilder;

use cardcut_domain::traits::TreeBuilder;
use cardcut_domain::StructuredDocument;
use std::path::Path;

/// Extensions the batch walker should pick up
pub const SOURCE_EXTENSIONS: &[&str] = &["docx", "pdf", "html", "htm"];

/// Lowercase extension of a path
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// True when the path has one of the [`SOURCE_EXTENSIONS`]
pub fn is_source_file(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
}

/// Dispatches to the builder matching a file's extension
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTreeBuilder {
    docx: DocxTreeBuilder,
    html: HtmlTreeBuilder,
    pdf: PdfTreeBuilder,
}

impl FileTreeBuilder {
    /// Create a dispatching builder
    pub fn new() -> Self {
        Self::default()
    }
}

impl TreeBuilder for FileTreeBuilder {
    type Error = IngestError;

    fn supports(&self, path: &Path) -> bool {
        self.docx.supports(path) || self.html.supports(path) || self.pdf.supports(path)
    }

    fn build_tree(&self, path: &Path) -> Result<StructuredDocument, IngestError> {
        if self.docx.supports(path) {
            return self.docx.build_tree(path);
        }
        if self.html.supports(path) {
            return self.html.build_tree(path);
        }
        if self.pdf.supports(path) {
            return self.pdf.build_tree(path);
        }
        match extension_of(path).as_deref() {
            Some(ext) => Err(IngestError::UnsupportedFormat(format!(
                "{}: unrecognized extension '{}'",
                path.display(),
                ext
            ))),
            None => Err(IngestError::UnsupportedFormat(format!(
                "{}: no file extension",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_source_file_detection() {
        assert!(is_source_file(Path::new("a/b/Brief.DOCX")));
        assert!(is_source_file(Path::new("cards.html")));
        assert!(is_source_file(Path::new("scan.pdf")));
        assert!(!is_source_file(Path::new("notes.txt")));
        assert!(!is_source_file(Path::new("README")));
    }

    #[test]
    fn test_pdf_file_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Scan.PDF");
        fs::write(&path, pdf::tests::sample_pdf(&["Alice 20 argues X.", "This continues."]))
            .unwrap();

        let builder = FileTreeBuilder::new();
        assert!(builder.supports(&path));
        let document = builder.build_tree(&path).unwrap();
        assert_eq!(document.blocks().len(), 2);
        assert_eq!(document.blocks()[1].text(), "This continues.");
    }

    #[test]
    fn test_broken_pdf_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF").unwrap();

        let result = FileTreeBuilder::new().build_tree(&path);
        assert!(matches!(result, Err(IngestError::Pdf(_))));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let builder = FileTreeBuilder::new();
        assert!(!builder.supports(Path::new("notes.txt")));
        let result = builder.build_tree(Path::new("notes.txt"));
        assert!(matches!(result, Err(IngestError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_html_file_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.html");
        fs::write(&path, "<p>Alice '20 argues X.</p><p>This continues.</p>").unwrap();

        let document = FileTreeBuilder::new().build_tree(&path).unwrap();
        assert_eq!(document.blocks().len(), 2);
        assert_eq!(document.source(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_missing_docx_is_io_error() {
        let result = FileTreeBuilder::new().build_tree(Path::new("/nonexistent/brief.docx"));
        assert!(matches!(result, Err(IngestError::Io(_))));
    }
}
