//! Riformula Storage - Store Traits and Implementations
//!
//! Defines the storage abstraction the orchestrator depends on: the learned
//! example store, the positive/negative feedback store and the correction
//! store, each with an in-memory implementation for tests (and degraded
//! operation) and a JSON-file implementation for production. The bounded
//! response cache and the periodic snapshot scheduler also live here.

pub mod cache;
pub mod documents;
pub mod json_file;
pub mod memory;
pub mod snapshot;

pub use cache::{CacheStats, ResponseCache};
pub use documents::{CorrectionDocument, ExampleDocument, FeedbackDocument};
pub use json_file::{JsonCorrectionStore, JsonExampleStore, JsonFeedbackStore};
pub use memory::{InMemoryCorrectionStore, InMemoryExampleStore, InMemoryFeedbackStore};
pub use snapshot::SnapshotScheduler;

use riformula_core::{
    CorrectionStats, ExampleRecord, FeedbackPolarity, FeedbackStats, RiformulaResult,
};
use std::path::{Path, PathBuf};

// ============================================================================
// SNAPSHOT SOURCE
// ============================================================================

/// A store that can copy its full contents to a timestamped backup file.
///
/// Snapshots are best-effort: the scheduler logs failures and moves on, and
/// implementations must not hold request-path locks while writing.
pub trait SnapshotSource: Send + Sync {
    /// Human-readable name used in backup file names and logs.
    fn store_name(&self) -> &str;

    /// Write a backup into `backup_dir`, returning the created path.
    fn snapshot(&self, backup_dir: &Path) -> RiformulaResult<PathBuf>;
}

// ============================================================================
// STORE TRAITS
// ============================================================================

/// Persistent mapping from raw input text to accepted rewrites.
///
/// At most one record exists per distinct input (case-sensitive); records
/// are never deleted, only inserted or updated.
pub trait ExampleStore: SnapshotSource {
    /// O(1)-ish keyed lookup on the exact raw input.
    fn find_exact(&self, input: &str) -> RiformulaResult<Option<ExampleRecord>>;

    /// Linear scan for the best record scoring strictly above `threshold`.
    ///
    /// The running best starts at the threshold and only strictly greater
    /// scores replace it, so the first record above threshold wins ties.
    fn find_similar(&self, input: &str, threshold: f64)
        -> RiformulaResult<Option<ExampleRecord>>;

    /// Insert a new record or update the existing one for `input`,
    /// bumping its usage count and recency. Quality scores are recomputed
    /// for the whole store afterwards.
    fn upsert(&self, input: &str, output: &str) -> RiformulaResult<()>;

    /// Recompute every record's derived quality score as of now.
    fn recompute_quality_scores(&self) -> RiformulaResult<()>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Two persistent collections of human judgments, keyed loosely by the
/// original input text.
pub trait FeedbackStore: SnapshotSource {
    /// True iff some negative record matches BOTH the input and the
    /// candidate output above the feedback threshold. Matching only the
    /// input is not enough: same topic with a different bad output is not
    /// evidence against the new candidate.
    fn is_known_negative(&self, input: &str, candidate_output: &str) -> RiformulaResult<bool>;

    /// First positive record whose original contains (or is contained by)
    /// the input and scores above the feedback threshold; returns its
    /// accepted enhanced text.
    fn find_positive_replacement(&self, input: &str) -> RiformulaResult<Option<String>>;

    /// Record a judgment. A near-duplicate of an existing same-polarity
    /// record replaces it in place instead of appending; the polarity
    /// counter increments either way.
    fn record_feedback(
        &self,
        original: &str,
        enhanced: &str,
        polarity: FeedbackPolarity,
    ) -> RiformulaResult<()>;

    fn stats(&self) -> RiformulaResult<FeedbackStats>;
}

/// User-supplied rewrites of AI outputs, plus the request counter.
pub trait CorrectionStore: SnapshotSource {
    /// Record a correction; near-duplicates (on the original text) replace.
    fn record_correction(
        &self,
        original: &str,
        ai_generated: &str,
        user_corrected: &str,
    ) -> RiformulaResult<()>;

    /// Bump the fresh-generation request counter.
    fn record_request(&self) -> RiformulaResult<()>;

    fn stats(&self) -> RiformulaResult<CorrectionStats>;
}
