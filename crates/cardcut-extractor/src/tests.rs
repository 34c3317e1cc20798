//! Integration tests for the CardExtractor

#[cfg(test)]
mod tests {
    use crate::{
        BoundaryOracle, CardExtractor, ExtractorConfig, FailureReason, FixedBackoff,
        OracleOutcome, RetryPolicy, SpanLocator,
    };
    use cardcut_domain::traits::LlmProvider;
    use cardcut_domain::{
        Block, BoundaryDescriptor, MarkupTree, NodeId, Rgb, Run, RunStyle, StructuredDocument,
    };
    use cardcut_llm::MockProvider;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const TWO_CARDS: &str = r#"[
        {"author": "Alice '20", "start": "Alice '20 argues X", "end": "continues"},
        {"author": "Bob '19", "start": "Bob '19 claims Y", "end": "claims Y"}
    ]"#;

    fn sample_document() -> StructuredDocument {
        StructuredDocument::from_paragraphs([
            "Alice '20 argues X.",
            "This continues.",
            "Bob '19 claims Y.",
        ])
    }

    fn block_nodes(tree: &MarkupTree) -> Vec<NodeId> {
        tree.children(tree.root())
            .iter()
            .copied()
            .filter(|&id| tree.is_element(id))
            .collect()
    }

    /// No waiting between oracle attempts
    fn fast_config() -> ExtractorConfig {
        ExtractorConfig {
            retry_delay_ms: 0,
            ..ExtractorConfig::default()
        }
    }

    #[test]
    fn test_locator_finds_alice_card() {
        let tree = sample_document().to_markup_tree();
        let config = ExtractorConfig::default();
        let locator = SpanLocator::new(&tree, &config.anchor_tags, config.match_threshold);

        let span = locator.locate("Alice '20 argues X", "continues").unwrap();
        let blocks = block_nodes(&tree);
        assert_eq!(span.start, blocks[0]);
        assert_eq!(span.end, blocks[1]);
    }

    #[test]
    fn test_end_not_found_does_not_stop_other_descriptors() {
        let extractor = CardExtractor::new(fast_config()).unwrap();
        let descriptors = vec![
            BoundaryDescriptor::new("Alice '20", "Alice '20 argues X", "zebra quantum harmonica"),
            BoundaryDescriptor::new("Bob '19", "Bob '19 claims Y", "claims Y"),
            BoundaryDescriptor::new("Carol '21", "Carol '21 denies Z", "Z"),
        ];

        let result = extractor.extract_with_descriptors(&sample_document(), &descriptors);

        assert_eq!(result.cards.len(), 1);
        assert_eq!(result.cards[0].author, "Bob '19");
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.failures[0].author, "Alice '20");
        assert_eq!(result.failures[0].reason, FailureReason::EndNotFound);
        assert_eq!(result.failures[1].reason, FailureReason::StartNotFound);
        assert_eq!(result.metadata.descriptors_received, 3);
        assert_eq!(result.metadata.oracle_outcome, OracleOutcome::NotConsulted);
    }

    #[test]
    fn test_duplicate_author_runup_is_collapsed() {
        // The doubled author token is a known locator artifact; the repair is
        // specific to it
        let extractor = CardExtractor::new(fast_config()).unwrap();
        let document = StructuredDocument::from_paragraphs([
            "Alice '20 Alice '20 argues X and Y",
            "Unrelated closing line.",
        ]);
        let descriptor = BoundaryDescriptor::new("Alice '20", "Alice '20 argues X", "X and Y");

        let result = extractor.extract_with_descriptors(&document, &[descriptor]);
        let card = &result.cards[0];

        assert!(card.text.starts_with("Alice '20"));
        assert_eq!(card.text.matches("Alice '20").count(), 1);
        assert_eq!(card.markup, "<p>Alice '20 argues X and Y</p>");
    }

    #[tokio::test]
    async fn test_two_cards_end_to_end() {
        let oracle = BoundaryOracle::new(MockProvider::new(TWO_CARDS));
        let extractor = CardExtractor::new(fast_config()).unwrap();
        let document = sample_document();

        let result = extractor.extract(&oracle, &document).await;

        let authors: Vec<&str> = result.cards.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(authors, vec!["Alice '20", "Bob '19"]);
        assert_eq!(
            result.cards[0].markup,
            "<p>Alice '20 argues X.</p>\n<p>This continues.</p>"
        );
        assert_eq!(result.cards[1].markup, "<p>Bob '19 claims Y.</p>");
        assert_eq!(result.metadata.oracle_attempts, 1);
        assert_eq!(result.metadata.oracle_outcome, OracleOutcome::Parsed);
        assert!(result.failures.is_empty());

        // Fragments must not overlap in the source tree
        let tree = document.to_markup_tree();
        let alice = BoundaryDescriptor::new("Alice '20", "Alice '20 argues X", "continues");
        let bob = BoundaryDescriptor::new("Bob '19", "Bob '19 claims Y", "claims Y");
        let first = extractor.extract_fragment(&tree, &alice).unwrap();
        let second = extractor.extract_fragment(&tree, &bob).unwrap();
        let covered: HashSet<NodeId> = first
            .source_nodes
            .iter()
            .flat_map(|&id| tree.descendants(id))
            .collect();
        assert!(second
            .source_nodes
            .iter()
            .flat_map(|&id| tree.descendants(id))
            .all(|id| !covered.contains(&id)));

        let entries = result.metadata_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].author, "Bob '19");
        assert_eq!(entries[1].url, "");
    }

    #[tokio::test]
    async fn test_malformed_output_retried_once() {
        let provider = MockProvider::new(TWO_CARDS);
        provider.push_response("Sorry, I cannot help with that.");
        let oracle = BoundaryOracle::new(provider);
        let extractor = CardExtractor::new(fast_config()).unwrap();

        let result = extractor.extract(&oracle, &sample_document()).await;

        assert_eq!(oracle.provider().call_count(), 2);
        assert_eq!(result.metadata.oracle_attempts, 2);
        assert_eq!(result.cards.len(), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_retry_budget() {
        let oracle = BoundaryOracle::new(MockProvider::new("still not json"));
        let extractor = CardExtractor::new(fast_config()).unwrap();

        let result = extractor.extract(&oracle, &sample_document()).await;

        assert_eq!(oracle.provider().call_count(), 2);
        assert!(result.cards.is_empty());
        assert!(result.failures.is_empty());
        assert_eq!(result.metadata.oracle_outcome, OracleOutcome::Unparsable);
    }

    #[tokio::test]
    async fn test_unavailable_oracle_recovered_as_zero_cards() {
        let provider = MockProvider::new("[]");
        provider.push_error();
        provider.push_error();
        let oracle = BoundaryOracle::new(provider);
        let extractor = CardExtractor::new(fast_config()).unwrap();

        let result = extractor.extract(&oracle, &sample_document()).await;

        assert!(result.cards.is_empty());
        assert_eq!(result.metadata.oracle_attempts, 2);
        assert_eq!(result.metadata.oracle_outcome, OracleOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_empty_list_is_not_retried() {
        let oracle = BoundaryOracle::new(MockProvider::new("```json\n[]\n```"));
        let extractor = CardExtractor::new(fast_config()).unwrap();

        let result = extractor.extract(&oracle, &sample_document()).await;

        assert_eq!(oracle.provider().call_count(), 1);
        assert!(result.cards.is_empty());
        assert_eq!(result.metadata.oracle_outcome, OracleOutcome::Parsed);
    }

    #[tokio::test]
    async fn test_empty_document_skips_oracle() {
        let oracle = BoundaryOracle::new(MockProvider::new(TWO_CARDS));
        let extractor = CardExtractor::new(fast_config()).unwrap();

        let result = extractor.extract(&oracle, &StructuredDocument::default()).await;

        assert_eq!(oracle.provider().call_count(), 0);
        assert!(result.cards.is_empty());
    }

    #[tokio::test]
    async fn test_formatting_and_url_preserved() {
        let bold = RunStyle { bold: true, ..Default::default() };
        let highlight = RunStyle {
            highlight: Some("yellow".to_string()),
            underline: true,
            ..Default::default()
        };
        let document = StructuredDocument::new(vec![
            Block::paragraph(vec![Run::plain("Previous card ends here.")]),
            Block::paragraph(vec![
                Run::styled("Alice '20", bold),
                Run::plain(", Professor, https://example.org/paper"),
            ]),
            Block::paragraph(vec![
                Run::plain("We find that "),
                Run::styled("markets clear", highlight),
                Run::plain(" eventually."),
            ]),
        ]);
        let oracle = BoundaryOracle::new(MockProvider::new(
            r#"[{"author": "Alice '20", "start": "Alice '20, Professor", "end": "clear eventually"}]"#,
        ));
        let extractor = CardExtractor::new(fast_config()).unwrap();

        let result = extractor.extract(&oracle, &document).await;
        let card = &result.cards[0];

        assert_eq!(card.url, "https://example.org/paper");
        assert_eq!(
            card.markup,
            "<p><strong>Alice '20</strong>, Professor, https://example.org/paper</p>\n\
             <p>We find that <mark style=\"background-color: yellow;\"><u>markets clear</u></mark> eventually.</p>"
        );
        assert!(card.text.starts_with("Alice '20"));
    }

    /// Provider that answers only after `delay`
    struct SlowProvider {
        delay: Duration,
        calls: AtomicU32,
    }

    impl LlmProvider for SlowProvider {
        type Error = String;

        fn generate(&self, _prompt: &str) -> Result<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            Ok("[]".to_string())
        }
    }

    #[tokio::test]
    async fn test_oracle_timeout_is_retried_then_unavailable() {
        let provider = SlowProvider {
            delay: Duration::from_millis(1500),
            calls: AtomicU32::new(0),
        };
        let oracle = BoundaryOracle::new(provider);
        let config = ExtractorConfig {
            oracle_timeout_secs: 1,
            ..ExtractorConfig::default()
        };
        let extractor = CardExtractor::new(config)
            .unwrap()
            .with_retry_policy(RetryPolicy::new(2, Arc::new(FixedBackoff(Duration::ZERO))));

        let result = extractor.extract(&oracle, &sample_document()).await;

        assert!(result.cards.is_empty());
        assert_eq!(result.metadata.oracle_attempts, 2);
        assert_eq!(result.metadata.oracle_outcome, OracleOutcome::Unavailable);
        assert_eq!(oracle.provider().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_policy_override_limits_attempts() {
        let oracle = BoundaryOracle::new(MockProvider::new("not json at all"));
        let extractor = CardExtractor::new(ExtractorConfig::default())
            .unwrap()
            .with_retry_policy(RetryPolicy::no_retry());

        let result = extractor.extract(&oracle, &sample_document()).await;

        assert_eq!(result.metadata.oracle_attempts, 1);
        assert_eq!(result.metadata.oracle_outcome, OracleOutcome::Unparsable);
        assert_eq!(oracle.provider().call_count(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_end_keeps_truncated_card() {
        let red = RunStyle {
            color: Some(Rgb(255, 0, 0)),
            ..Default::default()
        };
        let document = StructuredDocument::new(vec![
            Block::paragraph(vec![
                Run::plain("Intro. "),
                Run::styled("Alice '20 argues X", red.clone()),
            ]),
            Block::paragraph(vec![
                Run::plain("Filler "),
                Run::styled("This continues.", red),
            ]),
        ]);
        let oracle = BoundaryOracle::new(MockProvider::new(
            r#"[{"author": "Alice '20", "start": "Alice '20 argues X", "end": "continues"}]"#,
        ));
        let config = ExtractorConfig {
            anchor_tags: vec!["span".to_string()],
            ..fast_config()
        };
        let extractor = CardExtractor::new(config).unwrap();

        let result = extractor.extract(&oracle, &document).await;

        assert_eq!(result.cards.len(), 1);
        assert!(result.failures.is_empty());
        assert_eq!(result.metadata.truncated_fragments, 1);
        assert_eq!(result.cards[0].text, "Alice '20 argues X");
    }

    #[test]
    fn test_typographic_entities_in_boundaries() {
        let extractor = CardExtractor::new(fast_config()).unwrap();
        let document = StructuredDocument::from_paragraphs([
            "Smith \u{2019}21 says the plan \u{2014} collapse follows.",
            "Nothing else.",
        ]);
        let descriptors = vec![BoundaryDescriptor::new(
            "Smith \u{2019}21",
            "Smith &rsquo;21 says the plan &mdash; collapse",
            "collapse follows",
        )];

        let result = extractor.extract_with_descriptors(&document, &descriptors);

        assert!(result.failures.is_empty());
        assert_eq!(result.cards.len(), 1);
        assert_eq!(
            result.cards[0].text,
            "Smith \u{2019}21 says the plan \u{2014} collapse follows."
        );
    }
}
