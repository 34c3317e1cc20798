//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Fraction of boundary words that must appear in a node's text (0.0-1.0]
    pub match_threshold: f64,

    /// Element tags eligible as start anchors
    pub anchor_tags: Vec<String>,

    /// Maximum time for a single oracle call (seconds)
    pub oracle_timeout_secs: u64,

    /// Total oracle attempts per document, first call included
    pub max_oracle_attempts: u32,

    /// Delay before each retry (milliseconds)
    pub retry_delay_ms: u64,
}

impl ExtractorConfig {
    /// Get the oracle timeout as a Duration
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Get the retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.match_threshold > 0.0 && self.match_threshold <= 1.0) {
            return Err(format!(
                "match_threshold {} out of range (0.0, 1.0]",
                self.match_threshold
            ));
        }
        if self.anchor_tags.is_empty() {
            return Err("anchor_tags must not be empty".to_string());
        }
        if self.oracle_timeout_secs == 0 {
            return Err("oracle_timeout_secs must be greater than 0".to_string());
        }
        if self.max_oracle_attempts == 0 {
            return Err("max_oracle_attempts must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration: 0.8 word containment, one retry after a second
    fn default() -> Self {
        Self {
            match_threshold: 0.8,
            anchor_tags: vec!["p".to_string(), "div".to_string(), "span".to_string()],
            oracle_timeout_secs: 120,
            max_oracle_attempts: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl ExtractorConfig {
    /// Strict preset: near-exact word containment, fewer false anchors
    pub fn strict() -> Self {
        Self {
            match_threshold: 0.95,
            ..Self::default()
        }
    }

    /// Lenient preset: tolerates heavier paraphrase and a longer oracle budget
    pub fn lenient() -> Self {
        Self {
            match_threshold: 0.6,
            oracle_timeout_secs: 300,
            max_oracle_attempts: 3,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.match_threshold, 0.8);
        assert_eq!(config.max_oracle_attempts, 2);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::strict().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = ExtractorConfig::default();
        config.match_threshold = 0.0;
        assert!(config.validate().is_err());
        config.match_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_attempts_and_tags() {
        let mut config = ExtractorConfig::default();
        config.max_oracle_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.anchor_tags.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("match_threshold = 0.7\n").unwrap();
        assert_eq!(config.match_threshold, 0.7);
        assert_eq!(config.oracle_timeout_secs, 120);
        assert_eq!(config.anchor_tags, vec!["p", "div", "span"]);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.match_threshold, parsed.match_threshold);
        assert_eq!(config.max_oracle_attempts, parsed.max_oracle_attempts);
        assert_eq!(config.retry_delay_ms, parsed.retry_delay_ms);
    }
}
