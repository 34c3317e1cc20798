//! Batch orchestration: find documents, extract, persist.
//!
//! Documents are processed one at a time. A document that cannot be read or
//! converted is skipped with a warning, and a card that cannot be written is
//! logged without affecting the rest of the batch.

use crate::error::{CliError, Result};
use crate::sink::{DirectorySink, HttpSink};
use cardcut_domain::traits::{CardSink, LlmProvider, TreeBuilder};
use cardcut_domain::{Card, CardMetadata, StructuredDocument};
use cardcut_extractor::{BoundaryOracle, CardExtractor, ExtractionResult, OracleOutcome};
use cardcut_ingest::{is_source_file, FileTreeBuilder};
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One input document and the directory its cards are written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// Source document
    pub source: PathBuf,
    /// Output directory for this document
    pub output_dir: PathBuf,
}

/// Resolve the documents to process.
///
/// A file input is taken as-is and writes straight into `output`. A directory
/// is walked recursively for source files; each document gets its own output
/// directory mirroring its relative path without the extension. Entries that
/// cannot be read are logged and skipped.
pub fn collect_inputs(input: &Path, output: &Path) -> Result<Vec<BatchItem>> {
    if input.is_file() {
        return Ok(vec![BatchItem {
            source: input.to_path_buf(),
            output_dir: output.to_path_buf(),
        }]);
    }
    if !input.is_dir() {
        return Err(CliError::InvalidInput(format!(
            "{} is neither a file nor a directory",
            input.display()
        )));
    }

    let mut items = Vec::new();
    for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", input.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_source_file(path) {
            continue;
        }
        let relative = path.strip_prefix(input).unwrap_or(path);
        items.push(BatchItem {
            source: path.to_path_buf(),
            output_dir: output.join(relative.with_extension("")),
        });
    }
    Ok(items)
}

/// What happened to one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum DocumentStatus {
    /// Cards were extracted (possibly zero)
    Extracted,
    /// Tree only; the oracle was not called
    DryRun,
    /// The document could not be read or converted
    Skipped(String),
}

/// Per-document line of the batch report
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Source document
    pub source: PathBuf,
    /// Outcome
    #[serde(flatten)]
    pub status: DocumentStatus,
    /// Blocks in the document tree
    pub blocks: usize,
    /// Styled runs across all blocks
    pub runs: usize,
    /// Characters in the plain-text projection
    pub characters: usize,
    /// Cards extracted
    pub cards: usize,
    /// Descriptors dropped
    pub dropped: usize,
    /// Cards whose sibling walk was cut short
    pub truncated: usize,
    /// Oracle calls made
    pub oracle_attempts: u32,
    /// How the oracle exchange ended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_outcome: Option<OracleOutcome>,
    /// Card files written
    pub written: usize,
    /// Cards accepted by the cards API
    pub submitted: usize,
}

impl DocumentReport {
    fn new(source: &Path, status: DocumentStatus) -> Self {
        Self {
            source: source.to_path_buf(),
            status,
            blocks: 0,
            runs: 0,
            characters: 0,
            cards: 0,
            dropped: 0,
            truncated: 0,
            oracle_attempts: 0,
            oracle_outcome: None,
            written: 0,
            submitted: 0,
        }
    }

    fn with_document(mut self, document: &StructuredDocument) -> Self {
        self.blocks = document.blocks().len();
        self.runs = document.run_count();
        self.characters = document.plain_text().chars().count();
        self
    }

    fn with_result(mut self, result: &ExtractionResult) -> Self {
        self.cards = result.cards.len();
        self.dropped = result.failures.len();
        self.truncated = result.metadata.truncated_fragments;
        self.oracle_attempts = result.metadata.oracle_attempts;
        self.oracle_outcome = Some(result.metadata.oracle_outcome);
        self
    }
}

/// Build the tree of a document, or report why it was skipped
fn build_document(
    builder: &FileTreeBuilder,
    path: &Path,
) -> std::result::Result<StructuredDocument, DocumentReport> {
    builder.build_tree(path).map_err(|e| {
        warn!("Skipping {}: {}", path.display(), e);
        DocumentReport::new(path, DocumentStatus::Skipped(e.to_string()))
    })
}

/// Build trees only and report their size
pub fn dry_run(items: &[BatchItem]) -> Vec<DocumentReport> {
    let builder = FileTreeBuilder::new();
    items
        .iter()
        .map(|item| match build_document(&builder, &item.source) {
            Ok(document) => {
                DocumentReport::new(&item.source, DocumentStatus::DryRun).with_document(&document)
            }
            Err(report) => report,
        })
        .collect()
}

/// Runs the full pipeline over a batch
pub struct BatchRunner<L> {
    builder: FileTreeBuilder,
    extractor: CardExtractor,
    oracle: BoundaryOracle<L>,
    http: Option<HttpSink>,
    runtime: tokio::runtime::Runtime,
}

impl<L> BatchRunner<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display + Send + 'static,
{
    /// Create a runner
    ///
    /// The oracle call is the only async step; it runs on a runtime owned by
    /// the runner so that sinks stay on plain blocking I/O.
    pub fn new(extractor: CardExtractor, oracle: BoundaryOracle<L>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            builder: FileTreeBuilder::new(),
            extractor,
            oracle,
            http: None,
            runtime,
        })
    }

    /// Also submit every card to the cards API
    pub fn with_submission(mut self, sink: HttpSink) -> Self {
        self.http = Some(sink);
        self
    }

    /// Process every item in order
    pub fn run(&mut self, items: &[BatchItem]) -> Vec<DocumentReport> {
        items
            .iter()
            .map(|item| {
                info!("Processing file: {}", item.source.display());
                self.process(item)
            })
            .collect()
    }

    /// Process one document end to end
    pub fn process(&mut self, item: &BatchItem) -> DocumentReport {
        let document = match build_document(&self.builder, &item.source) {
            Ok(document) => document,
            Err(report) => return report,
        };

        let result = self
            .runtime
            .block_on(self.extractor.extract(&self.oracle, &document));
        let mut report = DocumentReport::new(&item.source, DocumentStatus::Extracted)
            .with_document(&document)
            .with_result(&result);

        match DirectorySink::create(&item.output_dir) {
            Ok(mut sink) => {
                report.written = persist(&mut sink, &result.cards, &result.metadata_entries());
                debug!("Cards for {} in {}", item.source.display(), sink.dir().display());
            }
            Err(e) => warn!(
                "Cannot create output directory {}: {}",
                item.output_dir.display(),
                e
            ),
        }
        if let Some(http) = self.http.as_mut() {
            report.submitted = persist(http, &result.cards, &[]);
        }

        info!(
            "Processed {}: {} cards, {} written, {} submitted",
            item.source.display(),
            report.cards,
            report.written,
            report.submitted
        );
        report
    }
}

/// Hand every card to a sink, then the metadata listing
///
/// Failures are logged per card; returns the number of cards accepted.
pub fn persist<S>(sink: &mut S, cards: &[Card], metadata: &[CardMetadata]) -> usize
where
    S: CardSink,
    S::Error: Display,
{
    let mut accepted = 0;
    for (index, card) in cards.iter().enumerate() {
        match sink.write_card(index, card) {
            Ok(()) => accepted += 1,
            Err(e) => warn!("Failed to persist card {} ('{}'): {}", index + 1, card.author, e),
        }
    }
    if let Err(e) = sink.write_metadata(metadata) {
        warn!("Failed to persist metadata: {}", e);
    }
    accepted
}
