//! Riformula Core - Domain Types
//!
//! Pure domain layer shared by every other crate: record types, the
//! word-overlap similarity scorer, the input normalizer, configuration and
//! the error taxonomy. No I/O lives here.

pub mod config;
pub mod error;
pub mod normalize;
pub mod similarity;
pub mod types;

pub use config::{CacheConfig, RewriteConfig, SimilarityThresholds, ValidationPolicy};
pub use error::{
    ConfigError, InputError, RiformulaError, RiformulaResult, StoreError, UpstreamError,
};
pub use normalize::{normalize, NormalizedInput, GENERIC_ACTIVITY};
pub use similarity::{score, token_set};
pub use types::{
    CorrectionRecord, CorrectionStats, ExampleRecord, FeedbackPolarity, FeedbackRecord,
    FeedbackStats, Origin, RewriteResult,
};
