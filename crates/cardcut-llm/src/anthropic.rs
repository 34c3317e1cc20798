//! Anthropic Provider Implementation
//!
//! Provides integration with the Anthropic Messages API.
//!
//! # Features
//!
//! - Blocking HTTP communication, suited to the synchronous `LlmProvider` seam
//! - Configurable endpoint, model, output budget and API version
//! - Status codes mapped onto [`LlmError`] variants
//!
//! # Examples
//!
//! ```no_run
//! use cardcut_llm::AnthropicProvider;
//! use cardcut_domain::traits::LlmProvider;
//!
//! let provider = AnthropicProvider::new("sk-ant-...", "claude-3-5-sonnet-20241022")?;
//! let reply = provider.generate("Say hello")?;
//! # Ok::<(), cardcut_llm::LlmError>(())
//! ```

use crate::LlmError;
use cardcut_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Anthropic API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// Default API version header value
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Default output budget per call
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Default timeout for LLM requests (long documents are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    endpoint: String,
    model: String,
    api_key: String,
    api_version: String,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

/// Request body for the Messages API
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the Messages API
#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create a new provider against the default endpoint
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Authentication`] for an empty key and
    /// [`LlmError::Communication`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Authentication("API key is empty".to_string()));
        }

        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        let client = build_client(timeout)?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key,
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout,
            client,
        })
    }

    /// Bound each request by `timeout`
    ///
    /// Callers that enforce their own deadline should pass the same value so a
    /// request abandoned by the caller does not keep running in the background.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = build_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Override the API endpoint (scheme and host, no trailing path)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the output token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the `anthropic-version` header
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Model used for generation
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.endpoint)
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::blocking::Client, LlmError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Communication(format!("Failed to build client: {}", e)))
}

impl LlmProviderTrait for AnthropicProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        debug!("Sending {} char prompt to {}", prompt.len(), self.model);

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Authentication(error_text),
                404 => LlmError::ModelNotAvailable(self.model.clone()),
                429 => LlmError::RateLimitExceeded,
                _ => LlmError::Communication(format!("HTTP {}: {}", status, error_text)),
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| LlmError::InvalidResponse("No text content in response".to_string()))
    }
}
