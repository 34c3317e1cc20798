//! Core CardExtractor implementation

use crate::cleaner::clean;
use crate::config::ExtractorConfig;
use crate::entities::unescape_entities;
use crate::error::ExtractorError;
use crate::locator::SpanLocator;
use crate::materializer::materialize;
use crate::oracle::BoundaryOracle;
use crate::retry::RetryPolicy;
use crate::types::{
    DescriptorFailure, ExtractionMetadata, ExtractionResult, FailureReason, Fragment,
    OracleOutcome,
};
use crate::validator::{validate_response, ValidatedBoundaries};
use cardcut_domain::traits::LlmProvider;
use cardcut_domain::{BoundaryDescriptor, Card, MarkupTree, StructuredDocument};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns a structured document plus boundary descriptors into cards
#[derive(Debug, Clone)]
pub struct CardExtractor {
    config: ExtractorConfig,
    retry: RetryPolicy,
}

/// Descriptors obtained from the oracle, with how they were obtained
struct OracleReport {
    descriptors: Vec<BoundaryDescriptor>,
    attempts: u32,
    outcome: OracleOutcome,
}

impl CardExtractor {
    /// Create a new CardExtractor
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if the configuration is invalid.
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let retry = RetryPolicy::from_config(&config);
        Ok(Self { config, retry })
    }

    /// Replace the retry policy derived from the configuration
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract every card of a document
    ///
    /// Never fails: an unreachable or unintelligible oracle yields zero cards,
    /// and descriptors that cannot be resolved are recorded in
    /// [`ExtractionResult::failures`].
    pub async fn extract<L>(
        &self,
        oracle: &BoundaryOracle<L>,
        document: &StructuredDocument,
    ) -> ExtractionResult
    where
        L: LlmProvider + Send + Sync + 'static,
        L::Error: std::fmt::Display + Send + 'static,
    {
        let start_time = Instant::now();
        let source = document.source().unwrap_or("<memory>");

        if document.is_empty() {
            warn!("Document '{}' has no blocks; skipping oracle", source);
            return self.assemble(
                document,
                &MarkupTree::new(),
                &[],
                0,
                OracleOutcome::NotConsulted,
                start_time,
            );
        }

        let tree = document.to_markup_tree();
        let plain_text = tree.plain_text();

        info!(
            "Starting extraction for '{}': {} blocks, {} chars",
            source,
            document.blocks().len(),
            plain_text.len()
        );

        let report = self.request_descriptors(oracle, &plain_text).await;
        info!(
            "Oracle returned {} descriptors after {} attempt(s)",
            report.descriptors.len(),
            report.attempts
        );

        self.assemble(
            document,
            &tree,
            &report.descriptors,
            report.attempts,
            report.outcome,
            start_time,
        )
    }

    /// Extract cards for descriptors obtained elsewhere, without the oracle
    pub fn extract_with_descriptors(
        &self,
        document: &StructuredDocument,
        descriptors: &[BoundaryDescriptor],
    ) -> ExtractionResult {
        let start_time = Instant::now();
        let tree = document.to_markup_tree();
        self.assemble(
            document,
            &tree,
            descriptors,
            0,
            OracleOutcome::NotConsulted,
            start_time,
        )
    }

    /// Resolve one descriptor against a rendered document
    pub fn extract_fragment(
        &self,
        tree: &MarkupTree,
        descriptor: &BoundaryDescriptor,
    ) -> Result<Fragment, FailureReason> {
        let start_text = unescape_entities(&descriptor.start_text);
        let end_text = unescape_entities(&descriptor.end_text);

        let locator = SpanLocator::new(
            tree,
            &self.config.anchor_tags,
            self.config.match_threshold,
        );
        let span = locator.locate(&start_text, &end_text)?;

        let mut fragment = materialize(tree, span, &descriptor.author);
        clean(&mut fragment);

        if fragment.text().is_empty() {
            return Err(FailureReason::EmptyFragment);
        }
        Ok(fragment)
    }

    /// Ask the oracle until it yields a list or the retry budget runs out
    async fn request_descriptors<L>(
        &self,
        oracle: &BoundaryOracle<L>,
        plain_text: &str,
    ) -> OracleReport
    where
        L: LlmProvider + Send + Sync + 'static,
        L::Error: std::fmt::Display + Send + 'static,
    {
        let mut attempt = 1;
        loop {
            let outcome = match timeout(
                self.config.oracle_timeout(),
                oracle.identify_boundaries(plain_text),
            )
            .await
            .map_err(|_| ExtractorError::Timeout)
            {
                Ok(Ok(raw)) => match validate_response(&raw) {
                    ValidatedBoundaries::Descriptors(descriptors) => {
                        return OracleReport {
                            descriptors,
                            attempts: attempt,
                            outcome: OracleOutcome::Parsed,
                        };
                    }
                    ValidatedBoundaries::Unparsable => {
                        warn!("Oracle attempt {} returned no list of objects", attempt);
                        OracleOutcome::Unparsable
                    }
                },
                Ok(Err(e)) | Err(e) => {
                    warn!("Oracle attempt {} failed: {}", attempt, e);
                    OracleOutcome::Unavailable
                }
            };

            if !self.retry.allows(attempt + 1) {
                warn!(
                    "Giving up on oracle after {} attempt(s); no cards for this document",
                    attempt
                );
                return OracleReport {
                    descriptors: Vec::new(),
                    attempts: attempt,
                    outcome,
                };
            }
            attempt += 1;
            self.retry.wait_before(attempt).await;
        }
    }

    fn assemble(
        &self,
        document: &StructuredDocument,
        tree: &MarkupTree,
        descriptors: &[BoundaryDescriptor],
        oracle_attempts: u32,
        oracle_outcome: OracleOutcome,
        start_time: Instant,
    ) -> ExtractionResult {
        let mut cards = Vec::new();
        let mut failures = Vec::new();
        let mut truncated_fragments = 0;

        for descriptor in descriptors {
            match self.extract_fragment(tree, descriptor) {
                Ok(fragment) => {
                    if fragment.truncated {
                        truncated_fragments += 1;
                    }
                    debug!(
                        "Card '{}' spans {} source nodes",
                        descriptor.author,
                        fragment.source_nodes.len()
                    );
                    cards.push(Card {
                        author: descriptor.author.clone(),
                        url: fragment.url.clone(),
                        markup: fragment.markup(),
                        text: fragment.text(),
                    });
                }
                Err(reason) => {
                    warn!("Dropping card '{}': {}", descriptor.author, reason);
                    failures.push(DescriptorFailure {
                        author: descriptor.author.clone(),
                        reason,
                    });
                }
            }
        }

        let metadata = ExtractionMetadata {
            source: document.source().map(str::to_string),
            descriptors_received: descriptors.len(),
            oracle_attempts,
            oracle_outcome,
            truncated_fragments,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Extraction complete: {} cards, {} dropped, {} truncated",
            cards.len(),
            failures.len(),
            truncated_fragments
        );

        ExtractionResult {
            cards,
            failures,
            metadata,
        }
    }
}
