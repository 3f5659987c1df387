//! LLM provider implementations
//!
//! Concrete implementations of the GenerationProvider trait. OpenRouter is
//! the production provider; the scripted mock lives in the crate root.

pub mod openrouter;

pub use openrouter::{OpenRouterClient, OpenRouterGenerationProvider};

use riformula_core::{RiformulaError, UpstreamError};

pub(crate) fn request_failed(
    provider: &str,
    status: i32,
    message: impl Into<String>,
) -> RiformulaError {
    RiformulaError::Upstream(UpstreamError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    })
}

pub(crate) fn invalid_api_key(provider: &str) -> RiformulaError {
    RiformulaError::Upstream(UpstreamError::InvalidApiKey {
        provider: provider.to_string(),
    })
}

pub(crate) fn rate_limited(provider: &str, retry_after_ms: i64) -> RiformulaError {
    RiformulaError::Upstream(UpstreamError::RateLimited {
        provider: provider.to_string(),
        retry_after_ms,
    })
}

pub(crate) fn malformed_response(provider: &str, reason: impl Into<String>) -> RiformulaError {
    RiformulaError::Upstream(UpstreamError::MalformedResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}

pub(crate) fn no_response(provider: &str, reason: impl Into<String>) -> RiformulaError {
    RiformulaError::Upstream(UpstreamError::NoResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}
