//! Error types for Riformula operations

use thiserror::Error;

/// Input validation errors.
/// Recovered locally, surfaced to the caller as 4xx. Never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Input is empty")]
    Empty,

    #[error("Input too short: {length} chars (minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("Input too long: {length} chars (maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("Input lacks an action verb or technical activity: {suggestion}")]
    SemanticallyInvalid { suggestion: String },
}

/// Errors from the external generation service.
/// Fatal to the request only, never to the process.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("API key missing or not configured")]
    ApiKeyMissing,

    #[error("{provider} rejected the API key")]
    InvalidApiKey { provider: String },

    #[error("Model not found or unavailable: {model}")]
    ModelNotFound { model: String },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Response from {provider} lacks a usable completion: {reason}")]
    MalformedResponse { provider: String, reason: String },

    #[error("No response from {provider}: {reason}")]
    NoResponse { provider: String, reason: String },

    #[error("Request to {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },
}

/// Persistence errors.
/// Logged and downgraded: a request proceeds with empty-store defaults
/// rather than failing on store I/O.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O failure on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Corrupt store document at {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Snapshot failed: {reason}")]
    SnapshotFailed { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Riformula errors.
#[derive(Debug, Clone, Error)]
pub enum RiformulaError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Riformula operations.
pub type RiformulaResult<T> = Result<T, RiformulaError>;

// =============================================================================
// TESTS
// =============================================================================
