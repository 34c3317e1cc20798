//! Cardcut LLM Provider Layer
//!
//! Pluggable LLM provider implementations backing the boundary oracle.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from `cardcut-domain`.
//! Providers are plain values owned by the caller; there is no process-wide client.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `AnthropicProvider`: Anthropic Messages API integration
//!
//! # Examples
//!
//! ```
//! use cardcut_llm::MockProvider;
//! use cardcut_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod anthropic;

use cardcut_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use anthropic::AnthropicProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A scripted reply of the [`MockProvider`]
#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail,
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, Scripted>,
    queue: VecDeque<Scripted>,
    call_count: usize,
}

/// Mock LLM provider for deterministic testing
///
/// Replies are resolved in this order: the next queued reply (see
/// [`MockProvider::push_response`]), a prompt-specific reply, then the default.
///
/// # Examples
///
/// ```
/// use cardcut_llm::MockProvider;
/// use cardcut_domain::traits::LlmProvider;
///
/// // Fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Scripted sequence, then fall back to the default
/// let provider = MockProvider::new("[]");
/// provider.push_response("not json");
/// assert_eq!(provider.generate("p").unwrap(), "not json");
/// assert_eq!(provider.generate("p").unwrap(), "[]");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        let (prompt, response) = (prompt.into(), response.into());
        self.with_state(|s| s.responses.insert(prompt, Scripted::Reply(response)));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        self.with_state(|s| s.responses.insert(prompt, Scripted::Fail));
    }

    /// Queue a reply for the next call, whatever the prompt
    pub fn push_response(&self, response: impl Into<String>) {
        let response = response.into();
        self.with_state(|s| s.queue.push_back(Scripted::Reply(response)));
    }

    /// Queue a failure for the next call, whatever the prompt
    pub fn push_error(&self) {
        self.with_state(|s| s.queue.push_back(Scripted::Fail));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.with_state(|s| s.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.with_state(|s| s.call_count = 0);
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let scripted = self.with_state(|s| {
            s.call_count += 1;
            s.queue
                .pop_front()
                .or_else(|| s.responses.get(prompt).cloned())
        });

        match scripted {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Fail) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}
