//! Character reference decoding for oracle output
//!
//! The oracle reads the plain-text projection but sometimes echoes phrases
//! back with HTML character references (`&rsquo;`, `&#39;`, `&amp;`). These
//! are decoded with the HTML5 tokenizer so the full named set is covered.

use scraper::Html;

/// Decode every HTML5 character reference in `input`
///
/// Everything else passes through unchanged: `<` is never read as markup and
/// an `&` that starts no known reference stays literal.
///
/// # Examples
///
/// ```
/// use cardcut_extractor::unescape_entities;
///
/// assert_eq!(unescape_entities("Alice &#39;20 &amp; Bob"), "Alice '20 & Bob");
/// assert_eq!(unescape_entities("Smith&rsquo;s plan"), "Smith\u{2019}s plan");
/// assert_eq!(unescape_entities("fish &chips;"), "fish &chips;");
/// ```
pub fn unescape_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let fragment = Html::parse_fragment(&input.replace('<', "&lt;"));
    fragment.root_element().text().collect()
}
