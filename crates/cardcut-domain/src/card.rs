//! Card module - boundary hints in, attributed passages out

/// Approximate boundaries of one card, as proposed by the boundary oracle
///
/// Not trusted: `start_text` and `end_text` are free text that must occur,
/// approximately, inside the document's flattened text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryDescriptor {
    /// Author token, e.g. "Massey '17"
    pub author: String,

    /// Opening words of the card, normally beginning with the author token
    pub start_text: String,

    /// Closing words of the card
    pub end_text: String,
}

impl BoundaryDescriptor {
    /// Create a descriptor
    pub fn new(
        author: impl Into<String>,
        start_text: impl Into<String>,
        end_text: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            start_text: start_text.into(),
            end_text: end_text.into(),
        }
    }

    /// True when every field is non-empty after trimming
    pub fn is_complete(&self) -> bool {
        !self.author.trim().is_empty()
            && !self.start_text.trim().is_empty()
            && !self.end_text.trim().is_empty()
    }
}

/// One extracted, attributed passage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Author token of the card
    pub author: String,

    /// First source URL found in the card's markup, empty when absent
    pub url: String,

    /// Cleaned markup fragment
    pub markup: String,

    /// Plain text of the fragment, text leaves joined by single spaces
    pub text: String,
}

impl Card {
    /// The `{author, url}` entry describing this card in a metadata listing
    pub fn metadata(&self) -> CardMetadata {
        CardMetadata {
            author: self.author.clone(),
            url: self.url.clone(),
        }
    }

    /// Wrap the markup as a standalone page
    pub fn to_html_document(&self) -> String {
        format!("<html><body>{}</body></html>", self.markup)
    }
}

/// Per-card entry of a document's metadata listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMetadata {
    /// Author token
    pub author: String,

    /// Source URL, empty when absent
    pub url: String,
}
