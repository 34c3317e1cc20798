//! Bounded retry policy for oracle calls

use crate::config::ExtractorConfig;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Delay strategy between oracle attempts
pub trait Backoff: Debug + Send + Sync {
    /// Delay before attempt `attempt` (1-based; never called for the first)
    fn delay(&self, attempt: u32) -> Duration;
}

/// The same delay before every retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff(pub Duration);

impl Backoff for FixedBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

/// How many times to ask the oracle, and how long to wait in between
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Arc<dyn Backoff>,
}

impl RetryPolicy {
    /// Create a policy; at least one attempt is always made
    pub fn new(max_attempts: u32, backoff: Arc<dyn Backoff>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Single attempt, no retry
    pub fn no_retry() -> Self {
        Self::new(1, Arc::new(FixedBackoff(Duration::ZERO)))
    }

    /// Policy described by the extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(
            config.max_oracle_attempts,
            Arc::new(FixedBackoff(config.retry_delay())),
        )
    }

    /// Total attempts, first call included
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// True when `attempt` (1-based) is allowed
    pub fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }

    /// Wait before `attempt`; a zero delay returns immediately
    pub async fn wait_before(&self, attempt: u32) {
        let delay = self.backoff.delay(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    /// One retry after a second
    fn default() -> Self {
        Self::new(2, Arc::new(FixedBackoff(Duration::from_secs(1))))
    }
}
