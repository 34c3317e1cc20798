//! Boundary Oracle client

use crate::error::ExtractorError;
use crate::prompt::PromptBuilder;
use cardcut_domain::traits::LlmProvider;
use std::sync::Arc;
use tracing::debug;

/// Caller-owned handle to the boundary oracle
///
/// Wraps an [`LlmProvider`]; there is no process-wide client. The same handle
/// can serve any number of documents, one call at a time or concurrently.
pub struct BoundaryOracle<L> {
    provider: Arc<L>,
}

impl<L> Clone for BoundaryOracle<L> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<L> BoundaryOracle<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display + Send + 'static,
{
    /// Create a new oracle handle
    pub fn new(provider: L) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &L {
        &self.provider
    }

    /// Ask for card boundaries in a document's plain text
    ///
    /// Returns the raw response. Provider failures surface as
    /// [`ExtractorError::OracleUnavailable`]; the response is not inspected.
    pub async fn identify_boundaries(&self, plain_text: &str) -> Result<String, ExtractorError> {
        let prompt = PromptBuilder::new(plain_text).build();
        debug!("Prompt length: {} chars", prompt.len());

        // The provider blocks on network I/O
        let provider = Arc::clone(&self.provider);
        let response = tokio::task::spawn_blocking(move || provider.generate(&prompt))
            .await
            .map_err(|e| ExtractorError::OracleUnavailable(format!("Oracle task failed: {}", e)))?
            .map_err(|e| ExtractorError::OracleUnavailable(e.to_string()))?;

        debug!("Oracle response length: {} chars", response.len());
        Ok(response)
    }
}
