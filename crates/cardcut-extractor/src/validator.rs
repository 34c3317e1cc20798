//! Validate raw oracle output into boundary descriptors

use cardcut_domain::BoundaryDescriptor;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Opening bracket of an array that is empty or starts with an object
static ARRAY_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*[\{\]]").expect("valid array pattern"));

/// Outcome of validating one oracle response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedBoundaries {
    /// No list of objects anywhere in the response; worth retrying
    Unparsable,

    /// Well-formed descriptors in the oracle's order, possibly none
    Descriptors(Vec<BoundaryDescriptor>),
}

impl ValidatedBoundaries {
    /// True for the retryable outcome
    pub fn is_unparsable(&self) -> bool {
        matches!(self, ValidatedBoundaries::Unparsable)
    }
}

/// Validate a raw oracle response
///
/// Markdown fences and surrounding prose are tolerated: the first JSON array
/// that is empty or holds at least one object is taken as the answer. Entries
/// that are not objects, or lack a non-empty `author`, `start` or `end`, are
/// dropped; order is preserved.
pub fn validate_response(response: &str) -> ValidatedBoundaries {
    match find_object_array(response) {
        Some(items) => ValidatedBoundaries::Descriptors(validate_entries(&items)),
        None => {
            debug!("No list of objects in {} char oracle response", response.len());
            ValidatedBoundaries::Unparsable
        }
    }
}

/// Filter parsed entries down to complete descriptors
pub fn validate_entries(items: &[Value]) -> Vec<BoundaryDescriptor> {
    let mut descriptors = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            warn!("Dropping oracle entry {}: not an object", idx);
            continue;
        };
        match descriptor_from_object(obj) {
            Some(descriptor) => descriptors.push(descriptor),
            None => warn!("Dropping oracle entry {}: missing author, start or end", idx),
        }
    }
    descriptors
}

fn find_object_array(response: &str) -> Option<Vec<Value>> {
    ARRAY_START.find_iter(response).find_map(|m| {
        let mut stream = serde_json::Deserializer::from_str(&response[m.start()..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Array(items)))
                if items.is_empty() || items.iter().any(Value::is_object) =>
            {
                Some(items)
            }
            _ => None,
        }
    })
}

fn descriptor_from_object(obj: &Map<String, Value>) -> Option<BoundaryDescriptor> {
    let author = field(obj, &["author"])?;
    let start = field(obj, &["start", "start_text"])?;
    let end = field(obj, &["end", "end_text"])?;
    Some(BoundaryDescriptor::new(author, start, end))
}

/// First of `names` holding a string that is non-empty after trimming
fn field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| obj.get(*name).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn descriptors(outcome: ValidatedBoundaries) -> Vec<BoundaryDescriptor> {
        match outcome {
            ValidatedBoundaries::Descriptors(d) => d,
            ValidatedBoundaries::Unparsable => panic!("expected descriptors"),
        }
    }

    #[test]
    fn test_plain_array() {
        let response = r#"[{"author": "Alice '20", "start": "Alice '20 argues X", "end": "continues"}]"#;
        let parsed = descriptors(validate_response(response));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].author, "Alice '20");
        assert_eq!(parsed[0].end_text, "continues");
    }

    #[test]
    fn test_markdown_fence_and_prose() {
        let response = r#"Here are the cards I found:
```json
[
    {"author": "Bob '19", "start": "Bob '19 claims Y", "end": "so Y holds"}
]
```
Let me know if you need more."#;
        let parsed = descriptors(validate_response(response));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].start_text, "Bob '19 claims Y");
    }

    #[test]
    fn test_skips_arrays_without_objects() {
        let response = r#"Years [2019, 2020] then [{"author": "A", "start": "A b", "end": "c"}]"#;
        let parsed = descriptors(validate_response(response));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].author, "A");
    }

    #[test]
    fn test_empty_array_is_zero_cards_not_unparsable() {
        assert_eq!(
            validate_response("[]"),
            ValidatedBoundaries::Descriptors(Vec::new())
        );
    }

    #[test]
    fn test_unparsable_outputs() {
        assert!(validate_response("This is not JSON").is_unparsable());
        assert!(validate_response("null").is_unparsable());
        assert!(validate_response(r#"{"author": "A"}"#).is_unparsable());
        assert!(validate_response(r#"[{"author": "A", "start": "#).is_unparsable());
        assert!(validate_response("").is_unparsable());
    }

    #[test]
    fn test_field_aliases_and_trimming() {
        let response = r#"[{"author": "  Alice '20 ", "start_text": " Alice '20 argues", "end_text": "X. "}]"#;
        let parsed = descriptors(validate_response(response));
        assert_eq!(parsed[0], BoundaryDescriptor::new("Alice '20", "Alice '20 argues", "X."));
    }

    #[test]
    fn test_malformed_entries_dropped_in_order() {
        let items = vec![
            json!({"author": "A", "start": "A one", "end": "one"}),
            json!("stray string"),
            json!({"author": "B", "start": "   ", "end": "two"}),
            json!({"author": "C", "start": "C three", "end": 3}),
            json!({"author": "D", "start": "D four", "end": "four"}),
            json!(null),
        ];
        let parsed = validate_entries(&items);
        let authors: Vec<&str> = parsed.iter().map(|d| d.author.as_str()).collect();
        assert_eq!(authors, vec!["A", "D"]);
    }

    fn entry() -> impl Strategy<Value = (bool, Value)> {
        prop_oneof![
            "[a-z]{1,8}".prop_map(|w| (true, json!({"author": w, "start": format!("{} s", w), "end": "e"}))),
            Just((false, json!({"author": "", "start": "s", "end": "e"}))),
            Just((false, json!({"start": "s", "end": "e"}))),
            Just((false, json!(42))),
            Just((false, json!(["nested"]))),
        ]
    }

    proptest! {
        #[test]
        fn prop_keeps_exactly_the_well_formed_entries(entries in prop::collection::vec(entry(), 0..20)) {
            let items: Vec<Value> = entries.iter().map(|(_, v)| v.clone()).collect();
            let expected: Vec<String> = entries
                .iter()
                .filter(|(ok, _)| *ok)
                .map(|(_, v)| v["author"].as_str().unwrap_or_default().to_string())
                .collect();

            let parsed = validate_entries(&items);
            let authors: Vec<String> = parsed.into_iter().map(|d| d.author).collect();
            prop_assert_eq!(authors, expected);
        }
    }
}
