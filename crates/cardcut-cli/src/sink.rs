//! Card persistence: files on disk and the cards API.

use crate::error::{CliError, Result};
use cardcut_domain::traits::CardSink;
use cardcut_domain::{Card, CardMetadata};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Metadata listing written next to the card files.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// File name for the card at `index`, 1-based.
///
/// The author comes from the oracle, so everything but letters, digits, `'`,
/// `_` and `-` becomes `_`. Spaces, path separators and dots never reach the
/// file system.
pub fn card_file_name(index: usize, author: &str) -> String {
    let stem: String = author
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() => c,
            '\'' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    format!("{}_{}.html", stem, index + 1)
}

/// Writes one HTML page per card plus `metadata.json`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink, creating the directory if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[derive(Serialize)]
struct MetadataEntry<'a> {
    author: &'a str,
    url: &'a str,
}

impl CardSink for DirectorySink {
    type Error = CliError;

    fn write_card(&mut self, index: usize, card: &Card) -> Result<()> {
        let path = self.dir.join(card_file_name(index, &card.author));
        fs::write(&path, card.to_html_document())?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn write_metadata(&mut self, entries: &[CardMetadata]) -> Result<()> {
        let listing: Vec<MetadataEntry<'_>> = entries
            .iter()
            .map(|e| MetadataEntry {
                author: &e.author,
                url: &e.url,
            })
            .collect();
        let path = self.dir.join(METADATA_FILE_NAME);
        fs::write(&path, serde_json::to_string_pretty(&listing)?)?;
        debug!("Wrote {} with {} entries", path.display(), entries.len());
        Ok(())
    }
}

/// Request body for `POST {api_base}/cards`.
#[derive(Debug, Serialize)]
struct CardSubmission<'a> {
    html: String,
    text: &'a str,
    author: &'a str,
    url: &'a str,
}

/// Submits each card to the cards API.
///
/// Uses a blocking client; call it from outside any async runtime.
pub struct HttpSink {
    cards_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSink {
    /// Default request timeout (seconds)
    pub const TIMEOUT_SECS: u64 = 30;

    /// Create a sink for the API at `api_base`.
    pub fn new(api_base: &str) -> Result<Self> {
        let api_base = api_base.trim().trim_end_matches('/');
        if api_base.is_empty() {
            return Err(CliError::Config("API base URL is empty".to_string()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(Self::TIMEOUT_SECS))
            .build()
            .map_err(|e| CliError::Http(format!("Failed to build client: {}", e)))?;
        Ok(Self {
            cards_url: format!("{}/cards", api_base),
            client,
        })
    }

    /// Endpoint cards are posted to.
    pub fn cards_url(&self) -> &str {
        &self.cards_url
    }
}

impl CardSink for HttpSink {
    type Error = CliError;

    fn write_card(&mut self, _index: usize, card: &Card) -> Result<()> {
        let body = CardSubmission {
            html: card.to_html_document(),
            text: &card.text,
            author: &card.author,
            url: &card.url,
        };

        let response = self
            .client
            .post(&self.cards_url)
            .json(&body)
            .send()
            .map_err(|e| CliError::Http(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CliError::Http(format!("HTTP {}: {}", status, error_text)));
        }
        debug!("Submitted card '{}'", card.author);
        Ok(())
    }

    /// The API has no metadata endpoint.
    fn write_metadata(&mut self, _entries: &[CardMetadata]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        Card {
            author: "Alice '20".to_string(),
            url: "https://example.org".to_string(),
            markup: "<p>Alice '20 argues X.</p>".to_string(),
            text: "Alice '20 argues X.".to_string(),
        }
    }

    #[test]
    fn test_card_file_name() {
        assert_eq!(card_file_name(0, "Alice '20"), "Alice_'20_1.html");
        assert_eq!(card_file_name(4, "Van Der Berg '18"), "Van_Der_Berg_'18_5.html");
    }

    #[test]
    fn test_card_file_name_stays_in_directory() {
        assert_eq!(card_file_name(0, "Smith/Jones '20"), "Smith_Jones_'20_1.html");
        assert_eq!(card_file_name(1, "../escaped"), "___escaped_2.html");
        assert_eq!(card_file_name(2, "C:\\x"), "C__x_3.html");
        assert_eq!(card_file_name(3, "Müller-Lüdenscheidt '19"), "Müller-Lüdenscheidt_'19_4.html");
    }

    #[test]
    fn test_submission_body() {
        let card = card();
        let body = CardSubmission {
            html: card.to_html_document(),
            text: &card.text,
            author: &card.author,
            url: &card.url,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["html"], "<html><body><p>Alice '20 argues X.</p></body></html>");
        assert_eq!(json["text"], "Alice '20 argues X.");
        assert_eq!(json["author"], "Alice '20");
        assert_eq!(json["url"], "https://example.org");
    }

    #[test]
    fn test_http_sink_url() {
        let sink = HttpSink::new("http://localhost:3000/").unwrap();
        assert_eq!(sink.cards_url(), "http://localhost:3000/cards");
        assert!(HttpSink::new("  ").is_err());
    }

    #[test]
    fn test_http_sink_unreachable() {
        // Nothing listens on port 9
        let mut sink = HttpSink::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(sink.write_card(0, &card()), Err(CliError::Http(_))));
    }
}
