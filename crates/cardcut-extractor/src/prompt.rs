//! Prompt engineering for card boundary identification

/// Builds the prompt sent to the boundary oracle
pub struct PromptBuilder {
    text: String,
}

impl PromptBuilder {
    /// Create a new prompt builder around a document's plain text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Build the complete identification prompt
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(self.text.len() + 2048);

        // 1. Instructions and output format
        prompt.push_str(IDENTIFICATION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. The text to analyze
        prompt.push_str("Text to analyze:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.text);
        prompt.push_str("\n---\n\n");

        // 3. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

const IDENTIFICATION_INSTRUCTIONS: &str = r#"Analyze the following text and identify each distinct evidence card. For each card, extract:
1. The author's name and year (e.g., "Massey '17")
2. The exact start of the card content, WHICH INCLUDES THE AUTHOR NAME
3. The exact end of the card content

Rules:
- Each card should have a distinct author and year.
- Capture ALL cards in the text; some documents are hundreds of cards long.
- The start should be the beginning of the card, including the author name.
- The end should be the last few words of the card content.
- List the cards in the order they appear in the text.
- Copy start and end words verbatim from the text; do not paraphrase.

Format your response as a JSON array of objects, like this:
[
    {
        "author": "Author Name 'YY",
        "start": "Author Name 'YY [exact start of card content]",
        "end": "[exact end of card content]"
    }
]"#;

const OUTPUT_FORMAT_REMINDER: &str = "Respond with ONLY the JSON array. Never include text outside the JSON.";
