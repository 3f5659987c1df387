//! Shared fixtures and generators for Riformula tests.
//!
//! Builders for in-memory store wiring, canned Italian activity inputs and
//! proptest strategies. Consumed as a dev-dependency by the engine and API
//! crates.

use chrono::Utc;
use riformula_core::{ExampleRecord, FeedbackPolarity, SimilarityThresholds};
use riformula_llm::ScriptedProvider;
use riformula_storage::{
    FeedbackStore, InMemoryCorrectionStore, InMemoryExampleStore, InMemoryFeedbackStore,
};
use std::sync::Arc;

/// Informal descriptions in the register the service receives.
pub const SAMPLE_INPUTS: &[&str] = &[
    "presidio zara",
    "creazione utente richiesto + settaggio impostazioni rds",
    "supporto outlook + ticket aperto",
    "installazione software antivirus su server exchange",
    "configurazione server e installazione aggiornamenti di sicurezza",
];

/// The formal counterpart of `SAMPLE_INPUTS[0]`.
pub const SAMPLE_OUTPUT: &str = "Presidio tecnico presso il punto vendita Zara.";

/// A record with the given usage count, timestamped now.
pub fn example_record(input: &str, output: &str, usage_count: u32) -> ExampleRecord {
    let now = Utc::now();
    let mut record = ExampleRecord::new(input, output, now);
    record.usage_count = usage_count;
    record.recompute_quality(now);
    record
}

/// Fresh in-memory store trio sharing default thresholds, ready to inject
/// into an engine.
pub struct StoreFixture {
    pub examples: Arc<InMemoryExampleStore>,
    pub feedback: Arc<InMemoryFeedbackStore>,
    pub corrections: Arc<InMemoryCorrectionStore>,
}

impl StoreFixture {
    pub fn new() -> Self {
        let thresholds = SimilarityThresholds::default();
        Self {
            examples: Arc::new(InMemoryExampleStore::new()),
            feedback: Arc::new(InMemoryFeedbackStore::new(thresholds)),
            corrections: Arc::new(InMemoryCorrectionStore::new(thresholds)),
        }
    }

    /// Pre-record negative feedback, as a user rejecting `enhanced` would.
    pub fn with_negative_feedback(self, original: &str, enhanced: &str) -> Self {
        self.feedback
            .record_feedback(original, enhanced, FeedbackPolarity::Negative)
            .expect("in-memory record_feedback cannot fail");
        self
    }

    /// Pre-record positive feedback.
    pub fn with_positive_feedback(self, original: &str, enhanced: &str) -> Self {
        self.feedback
            .record_feedback(original, enhanced, FeedbackPolarity::Positive)
            .expect("in-memory record_feedback cannot fail");
        self
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A scripted provider pre-loaded with the given completions, in order.
pub fn scripted_provider(outputs: &[&str]) -> Arc<ScriptedProvider> {
    let provider = ScriptedProvider::new("test/model");
    for output in outputs {
        provider.enqueue(*output);
    }
    Arc::new(provider)
}

/// Proptest strategies for generator-driven tests.
pub mod strategies {
    use proptest::prelude::*;

    /// Short Italian-looking activity descriptions.
    pub fn activity_description() -> impl Strategy<Value = String> {
        proptest::collection::vec("[a-zàèéìòù]{2,12}", 1..6)
            .prop_map(|words| words.join(" "))
    }

    /// Formal-looking sentences, capitalized and terminated.
    pub fn formal_sentence() -> impl Strategy<Value = String> {
        proptest::collection::vec("[a-zàèéìòù]{3,12}", 2..8).prop_map(|words| {
            let mut sentence = words.join(" ");
            if let Some(first) = sentence.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            sentence.push('.');
            sentence
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_record_fixture() {
        let record = example_record("presidio zara", SAMPLE_OUTPUT, 3);
        assert_eq!(record.usage_count, 3);
        assert!(record.quality_score > 0.0 && record.quality_score < 1.0);
    }

    #[test]
    fn test_store_fixture_wiring() {
        let fixture = StoreFixture::new()
            .with_negative_feedback("test input", "Test Output.")
            .with_positive_feedback("presidio zara", SAMPLE_OUTPUT);

        assert!(fixture
            .feedback
            .is_known_negative("test input", "Test Output.")
            .unwrap());
        let stats = fixture.feedback.stats().unwrap();
        assert_eq!(stats.total_positive, 1);
        assert_eq!(stats.total_negative, 1);
    }

    #[test]
    fn test_scripted_provider_fixture() {
        let provider = scripted_provider(&["Uno.", "Due."]);
        assert_eq!(provider.call_count(), 0);
    }
}
