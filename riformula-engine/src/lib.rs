//! Riformula Engine - Rewrite Orchestrator
//!
//! The control component: given a raw activity description, consults the
//! normalizer, the response cache, the learned example store and the
//! feedback store before falling back to the external generation service;
//! post-processes and validates the output, re-checks it against stored
//! negative feedback with a bounded parameter-escalated retry, and records
//! the final pair back into the stores.
//!
//! The engine owns no persistent state itself; every store arrives as an
//! injected trait object so tests can run entirely in memory.

use std::sync::Arc;
use std::time::Instant;

use riformula_core::{
    normalize, score, InputError, NormalizedInput, Origin, RewriteConfig, RewriteResult,
    RiformulaError, RiformulaResult, UpstreamError, ValidationPolicy,
};
use riformula_core::{CorrectionStats, ExampleRecord, FeedbackPolarity, FeedbackStats};
use riformula_llm::{GenerationProvider, GenerationRequest, PromptBuilder, SamplingParams};
use riformula_storage::{
    CacheStats, CorrectionStore, ExampleStore, FeedbackStore, ResponseCache,
};

pub mod postprocess;
pub mod retry;

pub use postprocess::{format_fallback, is_unusable, tidy_output};
pub use retry::RetryPolicy;

/// Warning attached to fallback responses.
const FALLBACK_WARNING: &str = "Si è verificato un problema con la risposta dell'AI. \
                                È stata applicata una formattazione di base.";

// ============================================================================
// REQUEST OPTIONS
// ============================================================================

/// Caller-supplied options for one rewrite request.
#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    /// The caller is retrying after rejecting a previous output.
    pub is_regeneration: bool,
    /// The rejected output, quoted in the regeneration prompt and used to
    /// re-roll results that reproduce it.
    pub previous_output: Option<String>,
}

// ============================================================================
// ENGINE
// ============================================================================

/// The rewrite orchestrator.
pub struct RewriteEngine {
    provider: Arc<dyn GenerationProvider>,
    examples: Arc<dyn ExampleStore>,
    feedback: Arc<dyn FeedbackStore>,
    corrections: Arc<dyn CorrectionStore>,
    cache: ResponseCache,
    retry: RetryPolicy,
    config: RewriteConfig,
}

impl RewriteEngine {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        examples: Arc<dyn ExampleStore>,
        feedback: Arc<dyn FeedbackStore>,
        corrections: Arc<dyn CorrectionStore>,
        config: RewriteConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            cache: ResponseCache::new(config.cache),
            provider,
            examples,
            feedback,
            corrections,
            retry,
            config,
        }
    }

    /// Rewrite one informal activity description.
    ///
    /// Read path, in order: cache, example store, positive feedback; only
    /// then is the external service called. Upstream failures are fatal to
    /// the request; store failures degrade and are logged.
    pub async fn rewrite(
        &self,
        raw_input: &str,
        options: &RewriteOptions,
    ) -> RiformulaResult<RewriteResult> {
        let started = Instant::now();

        // received -> validated
        let normalized = self.validate(raw_input)?;

        // A regeneration explicitly asks for a different output, so the
        // reuse read path would only hand back what was just rejected.
        if !options.is_regeneration {
            // validated -> cache-checked
            if let Some(output) = self.cache.get(raw_input) {
                tracing::debug!(input = raw_input, "served from response cache");
                return Ok(served(output, Origin::Cache, started, None));
            }

            // cache-checked -> example-checked
            if let Some(record) = self.lookup_example(raw_input) {
                tracing::debug!(input = raw_input, matched = %record.input, "served from example store");
                // Reuse counts as a use: bump the matched record, best-effort.
                if let Err(error) = self.examples.upsert(&record.input, &record.output) {
                    tracing::warn!(%error, "example usage bump failed");
                }
                return Ok(served(record.output, Origin::Cache, started, None));
            }

            // example-checked -> feedback-checked
            match self.feedback.find_positive_replacement(raw_input) {
                Ok(Some(replacement)) => {
                    tracing::debug!(input = raw_input, "served from positive feedback");
                    return Ok(served(replacement, Origin::PositiveFeedback, started, None));
                }
                Ok(None) => {}
                Err(error) => tracing::warn!(%error, "positive feedback lookup failed"),
            }
        }

        // feedback-checked -> generated
        let params = if options.is_regeneration {
            SamplingParams::regeneration()
        } else {
            SamplingParams::base()
        };
        let mut builder = PromptBuilder::new();
        if options.is_regeneration {
            if let Some(previous) = &options.previous_output {
                builder = builder.with_rejected_output(previous);
            }
        }
        let request = GenerationRequest {
            system_prompt: builder.system_prompt(),
            user_input: normalized.processed_input.clone(),
            params,
        };

        let raw_output = match self.provider.generate(&request).await {
            Ok(text) => text,
            Err(RiformulaError::Upstream(UpstreamError::MalformedResponse { reason, .. })) => {
                tracing::warn!(reason = %reason, "malformed upstream response, serving fallback");
                return Ok(self.fallback(&normalized, started));
            }
            Err(other) => return Err(other),
        };

        // generated -> output-checked
        let mut output = tidy_output(&raw_output, self.config.max_sentences);
        if is_unusable(&output) {
            tracing::warn!(raw = %raw_output, "unusable upstream output, serving fallback");
            return Ok(self.fallback(&normalized, started));
        }

        // A bounded retry budget is shared by the two regeneration
        // triggers below.
        let mut attempt = 0u32;

        // A regeneration that reproduces the just-rejected output is
        // re-rolled with harder parameters.
        if options.is_regeneration {
            if let Some(previous) = options.previous_output.as_deref() {
                if attempt < self.retry.max_retries
                    && score(&output, previous) > self.config.thresholds.feedback_match
                {
                    tracing::info!("regenerated output too close to the rejected one, re-rolling");
                    output = self
                        .regenerate(&normalized, previous, attempt, output)
                        .await;
                    attempt += 1;
                }
            }
        }

        // output-checked -> negative-feedback-checked
        let known_negative = self
            .feedback
            .is_known_negative(raw_input, &output)
            .unwrap_or_else(|error| {
                tracing::warn!(%error, "negative feedback lookup failed");
                false
            });
        if known_negative && attempt < self.retry.max_retries {
            tracing::info!(input = raw_input, "output matches stored negative feedback, regenerating");
            let rejected = output.clone();
            output = self.regenerate(&normalized, &rejected, attempt, output).await;
        }

        // finalized -> store-updated (best-effort, never fails the response)
        self.finalize_stores(raw_input, &output);

        Ok(served(output, Origin::Fresh, started, None))
    }

    /// Record a human judgment on a served output.
    pub fn submit_feedback(
        &self,
        original: &str,
        enhanced: &str,
        polarity: FeedbackPolarity,
    ) -> RiformulaResult<()> {
        if original.trim().is_empty() || enhanced.trim().is_empty() {
            return Err(InputError::Empty.into());
        }
        self.feedback.record_feedback(original, enhanced, polarity)
    }

    /// Record a user-supplied correction of an AI output.
    pub fn submit_correction(
        &self,
        original: &str,
        ai_output: &str,
        user_output: &str,
    ) -> RiformulaResult<()> {
        if original.trim().is_empty() || ai_output.trim().is_empty() || user_output.trim().is_empty()
        {
            return Err(InputError::Empty.into());
        }
        self.corrections
            .record_correction(original, ai_output, user_output)
    }

    /// Probe the generation service's credentials.
    pub async fn check_upstream(&self) -> RiformulaResult<()> {
        self.provider.auth_check().await
    }

    pub fn feedback_stats(&self) -> RiformulaResult<FeedbackStats> {
        self.feedback.stats()
    }

    pub fn correction_stats(&self) -> RiformulaResult<CorrectionStats> {
        self.corrections.stats()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn example_count(&self) -> usize {
        self.examples.len()
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Pipeline stages
    // ------------------------------------------------------------------

    fn validate(&self, raw: &str) -> RiformulaResult<NormalizedInput> {
        let normalized = normalize(raw)?;

        let length = raw.trim().chars().count();
        if length < self.config.min_input_chars {
            return Err(InputError::TooShort {
                length,
                min: self.config.min_input_chars,
            }
            .into());
        }
        if length > self.config.max_input_chars {
            return Err(InputError::TooLong {
                length,
                max: self.config.max_input_chars,
            }
            .into());
        }

        if !normalized.is_valid {
            match self.config.validation_policy {
                ValidationPolicy::Strict => {
                    return Err(InputError::SemanticallyInvalid {
                        suggestion: normalized
                            .suggestions
                            .first()
                            .cloned()
                            .unwrap_or_default(),
                    }
                    .into());
                }
                ValidationPolicy::Advisory => {
                    tracing::debug!(
                        input = raw,
                        suggestions = ?normalized.suggestions,
                        "input failed the advisory semantic check"
                    );
                }
            }
        }

        Ok(normalized)
    }

    /// Exact match first, then the best similar record above the reuse
    /// threshold. Store failures degrade to a miss.
    fn lookup_example(&self, input: &str) -> Option<ExampleRecord> {
        match self.examples.find_exact(input) {
            Ok(Some(record)) => return Some(record),
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "example exact lookup failed");
                return None;
            }
        }

        match self
            .examples
            .find_similar(input, self.config.thresholds.example_reuse)
        {
            Ok(hit) => hit,
            Err(error) => {
                tracing::warn!(%error, "example similarity lookup failed");
                None
            }
        }
    }

    /// One escalated regeneration. Keeps the current output when the retry
    /// fails or produces something unusable.
    async fn regenerate(
        &self,
        normalized: &NormalizedInput,
        rejected: &str,
        attempt: u32,
        current: String,
    ) -> String {
        let request = GenerationRequest {
            system_prompt: PromptBuilder::new()
                .with_rejected_output(rejected)
                .system_prompt(),
            user_input: normalized.processed_input.clone(),
            params: self.retry.params_for_attempt(attempt),
        };

        match self.provider.generate(&request).await {
            Ok(text) => {
                let candidate = tidy_output(&text, self.config.max_sentences);
                if is_unusable(&candidate) {
                    tracing::warn!("regeneration produced an unusable output, keeping previous");
                    current
                } else {
                    candidate
                }
            }
            Err(error) => {
                tracing::warn!(%error, "regeneration failed, keeping previous output");
                current
            }
        }
    }

    fn fallback(&self, normalized: &NormalizedInput, started: Instant) -> RewriteResult {
        served(
            format_fallback(&normalized.processed_input),
            Origin::Fallback,
            started,
            Some(FALLBACK_WARNING.to_string()),
        )
    }

    /// Write-back after a fresh generation: learn the pair, cache the final
    /// output, bump the request counter. Each step is best-effort.
    fn finalize_stores(&self, raw_input: &str, output: &str) {
        if let Err(error) = self.examples.upsert(raw_input, output) {
            tracing::warn!(%error, "example store update failed");
        }
        self.cache.put(raw_input, output);
        if let Err(error) = self.corrections.record_request() {
            tracing::warn!(%error, "request statistics update failed");
        }
    }
}

fn served(
    output: String,
    origin: Origin,
    started: Instant,
    warning: Option<String>,
) -> RewriteResult {
    RewriteResult {
        output,
        origin,
        duration_ms: started.elapsed().as_millis() as u64,
        warning,
    }
}

impl std::fmt::Debug for RewriteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteEngine")
            .field("model", &self.provider.model_id())
            .field("examples", &self.examples.len())
            .field("cache", &self.cache.stats().entry_count)
            .finish()
    }
}
