//! Error Types for the Riformula API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use riformula_core::{InputError, RiformulaError, StoreError, UpstreamError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur while serving a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    // ========================================================================
    // Upstream Errors (429, 502, 504)
    // ========================================================================
    /// The generation service rejected our credentials
    UpstreamAuth,

    /// The configured model is unknown to the generation service
    ModelNotFound,

    /// The generation service throttled the request
    UpstreamRateLimited,

    /// The generation call exceeded its deadline
    UpstreamTimeout,

    /// The generation service is unreachable or failing
    UpstreamUnavailable,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Persistence layer failure
    StoreError,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,

            ErrorCode::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,

            ErrorCode::UpstreamAuth
            | ErrorCode::ModelNotFound
            | ErrorCode::UpstreamUnavailable => StatusCode::BAD_GATEWAY,

            ErrorCode::StoreError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::UpstreamAuth => "Generation service rejected the configured API key",
            ErrorCode::ModelNotFound => "Requested model is not available",
            ErrorCode::UpstreamRateLimited => "Generation service rate limit reached",
            ErrorCode::UpstreamTimeout => "Generation service did not answer in time",
            ErrorCode::UpstreamUnavailable => "Generation service is unavailable",
            ErrorCode::StoreError => "Persistence operation failed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (retry hints, field errors, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a StoreError.
    pub fn store_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreError, message)
    }

    /// Create an UpstreamRateLimited error with a retry hint.
    pub fn rate_limited(retry_after_ms: i64) -> Self {
        Self::from_code(ErrorCode::UpstreamRateLimited)
            .with_details(serde_json::json!({ "retry_after_ms": retry_after_ms }))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling
/// in Axum: handlers return `ApiResult<T>` and errors serialize themselves.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

/// Convert engine errors into the API error envelope.
impl From<RiformulaError> for ApiError {
    fn from(err: RiformulaError) -> Self {
        match err {
            RiformulaError::Input(input) => match input {
                InputError::Empty => {
                    ApiError::invalid_input("Input non valido. Fornire una descrizione da riformulare.")
                }
                other => ApiError::invalid_input(other.to_string()),
            },

            RiformulaError::Upstream(upstream) => match upstream {
                UpstreamError::ApiKeyMissing | UpstreamError::InvalidApiKey { .. } => {
                    ApiError::from_code(ErrorCode::UpstreamAuth)
                }
                UpstreamError::ModelNotFound { model } => ApiError::new(
                    ErrorCode::ModelNotFound,
                    format!("Model '{}' was not found or is unavailable", model),
                ),
                UpstreamError::RateLimited { retry_after_ms, .. } => {
                    ApiError::rate_limited(retry_after_ms)
                }
                UpstreamError::Timeout { timeout_ms, .. } => ApiError::new(
                    ErrorCode::UpstreamTimeout,
                    format!("Generation call exceeded {}ms", timeout_ms),
                )
                .with_details(serde_json::json!({ "timeout_ms": timeout_ms })),
                UpstreamError::NoResponse { reason, .. } => {
                    ApiError::new(ErrorCode::UpstreamUnavailable, reason)
                }
                other => {
                    tracing::error!(error = %other, "upstream failure");
                    ApiError::from_code(ErrorCode::UpstreamUnavailable)
                }
            },

            RiformulaError::Store(store) => {
                tracing::error!(error = %store, "store failure");
                match store {
                    StoreError::LockPoisoned => ApiError::store_error("Store lock poisoned"),
                    // Paths stay in logs, never in responses.
                    _ => ApiError::from_code(ErrorCode::StoreError),
                }
            }

            RiformulaError::Config(config) => {
                tracing::error!(error = %config, "configuration failure");
                ApiError::internal_error("Service is misconfigured")
            }
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
