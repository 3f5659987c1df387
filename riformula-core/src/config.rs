//! Rewrite pipeline configuration.
//!
//! Knobs the observed behavior varies on (sentence limit, input bounds,
//! validation gating, reuse thresholds) are configuration here, not
//! constants buried in control flow. Everything loads from environment
//! variables with typed defaults and is validated before use.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigError, RiformulaResult};

/// Whether the semantic validity check gates requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Validity only produces suggestions; every input may generate.
    Advisory,
    /// Semantically invalid input is rejected with a 4xx-equivalent.
    Strict,
}

/// Similarity thresholds tuned against the max-denominator scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SimilarityThresholds {
    /// Minimum score for reusing a stored example (strictly greater than).
    pub example_reuse: f64,
    /// Score on input and output required for feedback matches.
    pub feedback_match: f64,
    /// Extra `enhanced` threshold for negative near-duplicate replacement.
    pub negative_enhanced_dup: f64,
    /// `original` threshold above which a feedback resubmission replaces.
    pub near_duplicate: f64,
}

impl Default for SimilarityThresholds {
    fn default() -> Self {
        Self {
            example_reuse: 0.6,
            feedback_match: 0.7,
            negative_enhanced_dup: 0.8,
            near_duplicate: 0.9,
        }
    }
}

/// Bounds for the in-process response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CacheConfig {
    pub max_entries: usize,
    /// Approximate byte weight across all entries (keys + values).
    pub max_weight_bytes: usize,
    /// Absolute time-to-live for an entry.
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_weight_bytes: 512 * 1024,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Master configuration for the rewrite pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RewriteConfig {
    /// Default upstream model identifier.
    pub model: String,
    /// Served outputs are truncated to this many sentences.
    pub max_sentences: usize,
    pub min_input_chars: usize,
    pub max_input_chars: usize,
    pub validation_policy: ValidationPolicy,
    pub thresholds: SimilarityThresholds,
    pub cache: CacheConfig,
    /// Deadline for a single external generation call.
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub upstream_timeout: Duration,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            model: "deepseek/deepseek-r1:free".to_string(),
            max_sentences: 2,
            min_input_chars: 1,
            max_input_chars: 2000,
            validation_policy: ValidationPolicy::Advisory,
            thresholds: SimilarityThresholds::default(),
            cache: CacheConfig::default(),
            upstream_timeout: Duration::from_secs(60),
        }
    }
}

impl RewriteConfig {
    /// Create a RewriteConfig from environment variables.
    ///
    /// Environment variables:
    /// - `RIFORMULA_MODEL`: default model id (default: deepseek/deepseek-r1:free)
    /// - `RIFORMULA_MAX_SENTENCES`: sentence truncation limit (default: 2)
    /// - `RIFORMULA_MIN_INPUT_CHARS`: minimum input length (default: 1)
    /// - `RIFORMULA_MAX_INPUT_CHARS`: maximum input length (default: 2000)
    /// - `RIFORMULA_STRICT_VALIDATION`: "true" enables hard rejection (default: false)
    /// - `RIFORMULA_CACHE_MAX_ENTRIES`: response cache entry cap (default: 256)
    /// - `RIFORMULA_CACHE_MAX_WEIGHT_BYTES`: response cache byte cap (default: 524288)
    /// - `RIFORMULA_CACHE_TTL_SECS`: response cache TTL (default: 3600)
    /// - `RIFORMULA_UPSTREAM_TIMEOUT_SECS`: generation deadline (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let validation_policy = match std::env::var("RIFORMULA_STRICT_VALIDATION") {
            Ok(value) if value.to_lowercase() == "true" => ValidationPolicy::Strict,
            _ => ValidationPolicy::Advisory,
        };

        Self {
            model: std::env::var("RIFORMULA_MODEL").unwrap_or(defaults.model),
            max_sentences: env_parse("RIFORMULA_MAX_SENTENCES", defaults.max_sentences),
            min_input_chars: env_parse("RIFORMULA_MIN_INPUT_CHARS", defaults.min_input_chars),
            max_input_chars: env_parse("RIFORMULA_MAX_INPUT_CHARS", defaults.max_input_chars),
            validation_policy,
            thresholds: defaults.thresholds,
            cache: CacheConfig {
                max_entries: env_parse("RIFORMULA_CACHE_MAX_ENTRIES", defaults.cache.max_entries),
                max_weight_bytes: env_parse(
                    "RIFORMULA_CACHE_MAX_WEIGHT_BYTES",
                    defaults.cache.max_weight_bytes,
                ),
                ttl: Duration::from_secs(env_parse(
                    "RIFORMULA_CACHE_TTL_SECS",
                    defaults.cache.ttl.as_secs(),
                )),
            },
            upstream_timeout: Duration::from_secs(env_parse(
                "RIFORMULA_UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout.as_secs(),
            )),
        }
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(RiformulaError::Config) if invalid.
    pub fn validate(&self) -> RiformulaResult<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "model".to_string(),
            }
            .into());
        }

        if self.max_sentences == 0 {
            return Err(invalid("max_sentences", "0", "must be at least 1"));
        }

        if self.min_input_chars > self.max_input_chars {
            return Err(invalid(
                "min_input_chars",
                &self.min_input_chars.to_string(),
                "must not exceed max_input_chars",
            ));
        }

        for (field, value) in [
            ("thresholds.example_reuse", self.thresholds.example_reuse),
            ("thresholds.feedback_match", self.thresholds.feedback_match),
            (
                "thresholds.negative_enhanced_dup",
                self.thresholds.negative_enhanced_dup,
            ),
            ("thresholds.near_duplicate", self.thresholds.near_duplicate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, &value.to_string(), "must be within [0, 1]"));
            }
        }

        if self.cache.max_entries == 0 {
            return Err(invalid("cache.max_entries", "0", "must be at least 1"));
        }

        if self.cache.max_weight_bytes == 0 {
            return Err(invalid("cache.max_weight_bytes", "0", "must be positive"));
        }

        if self.cache.ttl.is_zero() {
            return Err(invalid("cache.ttl", "0", "must be positive"));
        }

        if self.upstream_timeout.is_zero() {
            return Err(invalid("upstream_timeout", "0", "must be positive"));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn invalid(field: &str, value: &str, reason: &str) -> crate::error::RiformulaError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
