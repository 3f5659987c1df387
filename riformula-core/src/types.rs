//! Domain record types shared across stores, engine and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// EXAMPLE RECORDS
// ============================================================================

/// One accepted `(input, output)` pair the system has learned to reuse.
///
/// Invariant: at most one record per distinct raw `input` (case-sensitive).
/// Updates replace the output and bump `usage_count`; records are never
/// deleted automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExampleRecord {
    /// Original raw text, identity key for exact lookup. Not normalized.
    pub input: String,
    /// Accepted rewritten text.
    pub output: String,
    /// Times this record was created, reused or re-submitted. Always >= 1.
    pub usage_count: u32,
    /// Derived score in [0, 1]; recomputed, never authoritative.
    pub quality_score: f64,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl ExampleRecord {
    /// Create a fresh record for a never-seen input.
    pub fn new(input: impl Into<String>, output: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            usage_count: 1,
            quality_score: 1.0,
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Recompute the derived quality score as of `now`:
    /// `0.4 * usage + 0.4 * recency + 0.2 * length`, where usage
    /// asymptotically approaches 1 with use, recency decays linearly to 0
    /// over 30 days, and length rewards longer outputs up to a cap.
    pub fn recompute_quality(&mut self, now: DateTime<Utc>) {
        let usage = 1.0 - 1.0 / (self.usage_count as f64 + 1.0);

        let days_since_update =
            (now - self.last_updated_at).num_seconds().max(0) as f64 / 86_400.0;
        let recency = (1.0 - days_since_update / 30.0).max(0.0);

        let length = 0.2 + (self.output.chars().count() as f64 / 100.0).min(0.8);

        self.quality_score = 0.4 * usage + 0.4 * recency + 0.2 * length;
    }
}

// ============================================================================
// FEEDBACK RECORDS
// ============================================================================

/// Human judgment on one `(original, enhanced)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPolarity {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedbackRecord {
    /// Raw input text the judged output was generated for.
    pub original: String,
    /// The output that was judged.
    pub enhanced: String,
    pub timestamp: DateTime<Utc>,
}

/// Counters kept alongside the feedback collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedbackStats {
    pub total_positive: u64,
    pub total_negative: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// CORRECTION RECORDS
// ============================================================================

/// A user-supplied rewrite of an AI output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CorrectionRecord {
    pub original: String,
    pub ai_generated: String,
    pub user_corrected: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CorrectionStats {
    pub total_corrections: u64,
    /// Rewrite requests that reached a fresh generation.
    pub total_requests: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

// ============================================================================
// REWRITE RESULTS
// ============================================================================

/// Provenance of a served rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Served from the response cache or the learned example store.
    Cache,
    /// Served from a stored positive-feedback replacement.
    PositiveFeedback,
    /// Freshly generated by the external service.
    Fresh,
    /// Minimally formatted echo of the input after an unusable generation.
    Fallback,
}

/// Successful outcome of a rewrite request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RewriteResult {
    pub output: String,
    pub origin: Origin,
    pub duration_ms: u64,
    /// Present when the fallback path was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
