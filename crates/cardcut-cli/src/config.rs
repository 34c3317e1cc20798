//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use cardcut_extractor::ExtractorConfig;
use cardcut_llm::anthropic::{DEFAULT_API_VERSION, DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "cardcut.toml";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Boundary oracle connection
    #[serde(default)]
    pub oracle: OracleSettings,

    /// Extraction engine tuning
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Where cards go
    #[serde(default)]
    pub output: OutputSettings,

    /// Batch report display
    #[serde(default)]
    pub report: ReportSettings,
}

/// Boundary oracle connection settings.
///
/// The credential itself never lives in the file; only the name of the
/// environment variable holding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    /// API endpoint (scheme and host)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Output token budget per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// `anthropic-version` header value
    #[serde(default = "default_api_version")]
    pub anthropic_version: String,
}

/// Persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// POST cards to the cards API in addition to writing files
    #[serde(default)]
    pub submit: bool,

    /// Base URL of the cards API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// Report display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default report format
    #[serde(default = "default_format")]
    pub format: ReportFormat,
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// User-level configuration file path.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cardcut").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `./cardcut.toml`, then the
    /// user-level file, are tried before falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidates = std::iter::once(PathBuf::from(CONFIG_FILE_NAME)).chain(Self::user_path());
        for path in candidates {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        debug!("No configuration file found; using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&contents)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.extractor.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }
}

impl OracleSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        match env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(CliError::Config(format!(
                "Environment variable {} is not set",
                self.api_key_env
            ))),
        }
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
            anthropic_version: default_api_version(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            color: true,
            format: ReportFormat::Table,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_api_key_env() -> String {
    "ANTHROPIC_KEY".to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> ReportFormat {
    ReportFormat::Table
}
