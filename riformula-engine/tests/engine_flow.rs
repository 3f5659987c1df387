//! End-to-end engine tests over in-memory stores and a scripted provider.

use std::sync::Arc;

use riformula_core::{
    FeedbackPolarity, InputError, Origin, RewriteConfig, RiformulaError, UpstreamError,
    ValidationPolicy,
};
use riformula_engine::{RetryPolicy, RewriteEngine, RewriteOptions};
use riformula_llm::{GenerationProvider, ScriptedProvider};
use riformula_storage::{CorrectionStore, ExampleStore};
use riformula_test_utils::{scripted_provider, StoreFixture, SAMPLE_OUTPUT};

fn engine_with(
    provider: Arc<ScriptedProvider>,
    fixture: &StoreFixture,
    config: RewriteConfig,
) -> RewriteEngine {
    RewriteEngine::new(
        provider as Arc<dyn GenerationProvider>,
        fixture.examples.clone(),
        fixture.feedback.clone(),
        fixture.corrections.clone(),
        config,
        RetryPolicy::default_policy(),
    )
}

fn default_engine(provider: Arc<ScriptedProvider>, fixture: &StoreFixture) -> RewriteEngine {
    engine_with(provider, fixture, RewriteConfig::default())
}

// ----------------------------------------------------------------------
// Scenario A: fresh generation, then cache
// ----------------------------------------------------------------------

#[tokio::test]
async fn scenario_a_fresh_then_cached() {
    let provider = scripted_provider(&[SAMPLE_OUTPUT]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider.clone(), &fixture);

    let first = engine
        .rewrite("presidio zara", &RewriteOptions::default())
        .await
        .unwrap();
    assert_eq!(first.output, SAMPLE_OUTPUT);
    assert_eq!(first.origin, Origin::Fresh);
    assert_eq!(provider.call_count(), 1);

    let second = engine
        .rewrite("presidio zara", &RewriteOptions::default())
        .await
        .unwrap();
    assert_eq!(second.output, SAMPLE_OUTPUT);
    assert_eq!(second.origin, Origin::Cache);
    // No second call reached the generation stub.
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn fresh_generation_updates_stores() {
    let provider = scripted_provider(&[SAMPLE_OUTPUT]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider, &fixture);

    engine
        .rewrite("presidio zara", &RewriteOptions::default())
        .await
        .unwrap();

    let record = fixture
        .examples
        .find_exact("presidio zara")
        .unwrap()
        .expect("pair learned into the example store");
    assert_eq!(record.output, SAMPLE_OUTPUT);
    assert_eq!(fixture.corrections.stats().unwrap().total_requests, 1);
    assert_eq!(engine.cache_stats().entry_count, 1);
}

// ----------------------------------------------------------------------
// Scenario B: invalid input never reaches the provider
// ----------------------------------------------------------------------

#[tokio::test]
async fn scenario_b_empty_input_rejected() {
    let provider = scripted_provider(&[SAMPLE_OUTPUT]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider.clone(), &fixture);

    let error = engine
        .rewrite("", &RewriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        RiformulaError::Input(InputError::Empty)
    ));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn over_long_input_rejected() {
    let provider = scripted_provider(&[SAMPLE_OUTPUT]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider.clone(), &fixture);

    let oversized = "installato ".repeat(400);
    let error = engine
        .rewrite(&oversized, &RewriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        RiformulaError::Input(InputError::TooLong { .. })
    ));
    assert_eq!(provider.call_count(), 0);
}

// ----------------------------------------------------------------------
// Scenario C: known-negative output triggers one escalated retry
// ----------------------------------------------------------------------

#[tokio::test]
async fn scenario_c_negative_feedback_triggers_retry() {
    let provider = scripted_provider(&["Test Output.", "Verifica completata con esito positivo."]);
    let fixture = StoreFixture::new().with_negative_feedback("test input", "Test Output.");
    let engine = default_engine(provider.clone(), &fixture);

    let result = engine
        .rewrite("test input", &RewriteOptions::default())
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(result.output, "Verifica completata con esito positivo.");
    assert_eq!(result.origin, Origin::Fresh);

    // The retry used the escalation ladder, not the base parameters.
    let calls = provider.calls();
    assert_eq!(calls[0].params.temperature, 0.3);
    assert_eq!(calls[1].params.temperature, 0.8);
    assert!(calls[1].system_prompt.contains("rigenerazione"));
}

#[tokio::test]
async fn negative_retry_is_bounded_to_one() {
    // Both attempts reproduce the rejected output; the engine must stop
    // after a single automatic retry and serve what it has.
    let provider = scripted_provider(&["Test Output.", "Test Output."]);
    let fixture = StoreFixture::new().with_negative_feedback("test input", "Test Output.");
    let engine = default_engine(provider.clone(), &fixture);

    let result = engine
        .rewrite("test input", &RewriteOptions::default())
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(result.output, "Test Output.");
    assert_eq!(result.origin, Origin::Fresh);
}

#[tokio::test]
async fn failed_retry_keeps_first_output() {
    let provider = scripted_provider(&["Test Output."]);
    provider.enqueue_error(
        UpstreamError::RateLimited {
            provider: "openrouter".to_string(),
            retry_after_ms: 1000,
        }
        .into(),
    );
    let fixture = StoreFixture::new().with_negative_feedback("test input", "Test Output.");
    let engine = default_engine(provider.clone(), &fixture);

    let result = engine
        .rewrite("test input", &RewriteOptions::default())
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(result.output, "Test Output.");
}

// ----------------------------------------------------------------------
// Reuse read path
// ----------------------------------------------------------------------

#[tokio::test]
async fn similar_example_served_without_generation() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    fixture
        .examples
        .upsert(
            "installazione server aziendale",
            "Installazione del server aziendale completata.",
        )
        .unwrap();
    let engine = default_engine(provider.clone(), &fixture);

    // 3 shared tokens over max set size 4 = 0.75 > 0.6.
    let result = engine
        .rewrite(
            "installazione server aziendale urgente",
            &RewriteOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.origin, Origin::Cache);
    assert_eq!(result.output, "Installazione del server aziendale completata.");
    assert_eq!(provider.call_count(), 0);

    // Reuse bumped the matched record.
    let record = fixture
        .examples
        .find_exact("installazione server aziendale")
        .unwrap()
        .unwrap();
    assert_eq!(record.usage_count, 2);
}

#[tokio::test]
async fn positive_feedback_served_without_generation() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new().with_positive_feedback(
        "manutenzione programmata",
        "Manutenzione programmata eseguita secondo il piano concordato.",
    );
    let engine = default_engine(provider.clone(), &fixture);

    let result = engine
        .rewrite("manutenzione programmata", &RewriteOptions::default())
        .await
        .unwrap();

    assert_eq!(result.origin, Origin::PositiveFeedback);
    assert!(result.output.contains("piano concordato"));
    assert_eq!(provider.call_count(), 0);
}

// ----------------------------------------------------------------------
// Fallback path
// ----------------------------------------------------------------------

#[tokio::test]
async fn unusable_output_serves_formatted_fallback() {
    let provider = scripted_provider(&["ok."]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider.clone(), &fixture);

    let result = engine
        .rewrite("presidio zara", &RewriteOptions::default())
        .await
        .unwrap();

    assert_eq!(result.origin, Origin::Fallback);
    assert_eq!(result.output, "Presidio zara.");
    assert!(result.warning.is_some());

    // Fallbacks are never learned or cached.
    assert_eq!(fixture.examples.len(), 0);
    assert_eq!(engine.cache_stats().entry_count, 0);
}

#[tokio::test]
async fn malformed_response_serves_formatted_fallback() {
    let provider = scripted_provider(&[]);
    provider.enqueue_error(
        UpstreamError::MalformedResponse {
            provider: "openrouter".to_string(),
            reason: "no completion in any known field".to_string(),
        }
        .into(),
    );
    let fixture = StoreFixture::new();
    let engine = default_engine(provider, &fixture);

    let result = engine
        .rewrite("presidio zara", &RewriteOptions::default())
        .await
        .unwrap();
    assert_eq!(result.origin, Origin::Fallback);
    assert_eq!(result.output, "Presidio zara.");
}

#[tokio::test]
async fn upstream_errors_surface_to_caller() {
    let provider = scripted_provider(&[]);
    provider.enqueue_error(
        UpstreamError::InvalidApiKey {
            provider: "openrouter".to_string(),
        }
        .into(),
    );
    let fixture = StoreFixture::new();
    let engine = default_engine(provider, &fixture);

    let error = engine
        .rewrite("presidio zara", &RewriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        RiformulaError::Upstream(UpstreamError::InvalidApiKey { .. })
    ));

    // Nothing was committed on the failed request.
    assert_eq!(fixture.examples.len(), 0);
    assert_eq!(fixture.corrections.stats().unwrap().total_requests, 0);
}

// ----------------------------------------------------------------------
// Regeneration requests
// ----------------------------------------------------------------------

#[tokio::test]
async fn regeneration_bypasses_reuse_and_rerolls_similar_output() {
    let provider = scripted_provider(&[SAMPLE_OUTPUT, SAMPLE_OUTPUT, "Attività di presidio presso Zara."]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider.clone(), &fixture);

    // First request populates cache and example store.
    engine
        .rewrite("presidio zara", &RewriteOptions::default())
        .await
        .unwrap();
    assert_eq!(provider.call_count(), 1);

    // Regeneration must not serve the cached rejected output; and when the
    // new completion reproduces it, a harder re-roll follows.
    let options = RewriteOptions {
        is_regeneration: true,
        previous_output: Some(SAMPLE_OUTPUT.to_string()),
    };
    let result = engine.rewrite("presidio zara", &options).await.unwrap();

    assert_eq!(provider.call_count(), 3);
    assert_eq!(result.output, "Attività di presidio presso Zara.");

    let calls = provider.calls();
    // Regeneration starts from the loosened parameters, then escalates.
    assert_eq!(calls[1].params.temperature, 0.7);
    assert_eq!(calls[2].params.temperature, 0.8);
    assert!(calls[1].system_prompt.contains("rigenerazione"));
}

// ----------------------------------------------------------------------
// Validation policy
// ----------------------------------------------------------------------

#[tokio::test]
async fn advisory_validation_still_generates() {
    let provider = scripted_provider(&["Giornata di lavoro presso il cliente."]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider.clone(), &fixture);

    let result = engine
        .rewrite("giornata cliente milano", &RewriteOptions::default())
        .await
        .unwrap();
    assert_eq!(result.origin, Origin::Fresh);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn strict_validation_rejects_without_generation() {
    let provider = scripted_provider(&["Giornata di lavoro presso il cliente."]);
    let fixture = StoreFixture::new();
    let config = RewriteConfig {
        validation_policy: ValidationPolicy::Strict,
        ..Default::default()
    };
    let engine = engine_with(provider.clone(), &fixture, config);

    let error = engine
        .rewrite("giornata cliente milano", &RewriteOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        RiformulaError::Input(InputError::SemanticallyInvalid { .. })
    ));
    assert_eq!(provider.call_count(), 0);
}

// ----------------------------------------------------------------------
// Post-processing on served outputs
// ----------------------------------------------------------------------

#[tokio::test]
async fn generated_output_is_tidied_before_serving() {
    let provider =
        scripted_provider(&["- installato l'antivirus sul server. Verifica completata. Terza frase."]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider, &fixture);

    let result = engine
        .rewrite("installazione antivirus", &RewriteOptions::default())
        .await
        .unwrap();

    // List marker stripped, capitalized, truncated at two sentences.
    assert_eq!(
        result.output,
        "Installato l'antivirus sul server. Verifica completata."
    );

    // The cache holds the post-processed text, never the raw completion.
    let cached = engine
        .rewrite("installazione antivirus", &RewriteOptions::default())
        .await
        .unwrap();
    assert_eq!(cached.origin, Origin::Cache);
    assert_eq!(cached.output, result.output);
}

// ----------------------------------------------------------------------
// Feedback and correction submission
// ----------------------------------------------------------------------

#[tokio::test]
async fn submitted_feedback_reaches_the_store() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider, &fixture);

    engine
        .submit_feedback("presidio zara", SAMPLE_OUTPUT, FeedbackPolarity::Positive)
        .unwrap();
    let stats = engine.feedback_stats().unwrap();
    assert_eq!(stats.total_positive, 1);

    let error = engine
        .submit_feedback("", SAMPLE_OUTPUT, FeedbackPolarity::Positive)
        .unwrap_err();
    assert!(matches!(error, RiformulaError::Input(InputError::Empty)));
}

#[tokio::test]
async fn submitted_correction_reaches_the_store() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    let engine = default_engine(provider, &fixture);

    engine
        .submit_correction("presidio zara", "Versione AI.", "Versione corretta dall'utente.")
        .unwrap();
    assert_eq!(engine.correction_stats().unwrap().total_corrections, 1);
}
