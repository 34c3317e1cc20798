//! Flexible containment matching

use std::collections::HashSet;

/// Lowercased whitespace tokens with surrounding punctuation stripped
///
/// A token made only of punctuation is kept as-is so that it can still match
/// itself.
fn tokens(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split_whitespace().map(|raw| {
        let lowered = raw.to_lowercase();
        let trimmed = lowered.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            lowered
        } else {
            trimmed.to_string()
        }
    })
}

/// Word-set containment test
///
/// Succeeds when at least `threshold` of `target`'s tokens occur anywhere
/// among `candidate`'s tokens. Order and position are ignored. An empty
/// target never matches.
///
/// # Examples
///
/// ```
/// use cardcut_extractor::flexible_match;
///
/// assert!(flexible_match("continues", "This continues.", 0.8));
/// assert!(flexible_match("Alice '20 argues X", "Alice '20 argues X.", 0.8));
/// assert!(!flexible_match("Bob '19 claims Y", "Alice '20 argues X.", 0.8));
/// ```
pub fn flexible_match(target: &str, candidate: &str, threshold: f64) -> bool {
    let target: Vec<String> = tokens(target).collect();
    if target.is_empty() {
        return false;
    }
    let candidate: HashSet<String> = tokens(candidate).collect();

    let hits = target.iter().filter(|t| candidate.contains(*t)).count();
    hits as f64 / target.len() as f64 >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert!(flexible_match("ALICE '20 ARGUES", "alice '20 argues x", 0.8));
        assert!(flexible_match("so, Y holds", "So Y holds.", 1.0));
    }

    #[test]
    fn test_word_granularity_not_substring() {
        assert!(!flexible_match("cat", "concatenate", 0.5));
    }

    #[test]
    fn test_partial_containment_against_threshold() {
        // 4 of 5 words present
        let target = "the quick brown fox jumps";
        let candidate = "the quick brown fox sleeps";
        assert!(flexible_match(target, candidate, 0.8));
        assert!(!flexible_match(target, candidate, 0.81));
    }

    #[test]
    fn test_empty_target_never_matches() {
        assert!(!flexible_match("", "anything", 0.1));
        assert!(!flexible_match("   ", "anything", 0.1));
    }

    #[test]
    fn test_punctuation_only_tokens() {
        assert!(flexible_match("--", "a -- b", 1.0));
        assert!(!flexible_match("--", "a b", 1.0));
    }

    proptest! {
        #[test]
        fn prop_reflexive(t in "\\PC{0,40}", threshold in 0.01f64..=1.0) {
            prop_assume!(!t.trim().is_empty());
            prop_assert!(flexible_match(&t, &t, threshold));
        }

        #[test]
        fn prop_monotonic_in_threshold(
            target in "[a-z ]{1,30}",
            candidate in "[a-z ]{0,60}",
            high in 0.01f64..=1.0,
            factor in 0.0f64..1.0,
        ) {
            let low = high * factor;
            if flexible_match(&target, &candidate, high) {
                prop_assert!(flexible_match(&target, &candidate, low));
            }
        }
    }
}
