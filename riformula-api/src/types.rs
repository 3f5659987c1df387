//! Request and response DTOs for the REST API.

use riformula_core::{CorrectionStats, FeedbackStats, RewriteResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// REWRITE
// ============================================================================

/// POST /api/riformula request body.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RewriteRequest {
    /// The informal activity description to rewrite.
    pub input: String,
    /// The caller rejected a previous output and wants a different one.
    #[serde(default)]
    pub is_regeneration: bool,
    /// The rejected output, when regenerating.
    #[serde(default)]
    pub previous_output: Option<String>,
}

/// Rewrite responses reuse the engine's result type directly.
pub type RewriteResponse = RewriteResult;

// ============================================================================
// FEEDBACK
// ============================================================================

/// POST /api/save-feedback request body.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedbackRequest {
    pub original: String,
    pub enhanced: String,
    pub is_positive: bool,
}

/// GET /api/feedback-stats response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedbackStatsResponse {
    #[serde(flatten)]
    pub stats: FeedbackStats,
}

// ============================================================================
// CORRECTIONS
// ============================================================================

/// POST /api/save-correction request body.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CorrectionRequest {
    pub original_description: String,
    pub ai_generated: String,
    pub user_corrected: String,
}

/// GET /api/correction-stats response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CorrectionStatsResponse {
    #[serde(flatten)]
    pub stats: CorrectionStats,
}

// ============================================================================
// SHARED
// ============================================================================

/// Generic acknowledgement for write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

impl AckResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// ============================================================================
// MODEL CATALOG
// ============================================================================

/// One selectable upstream model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub free: bool,
}

/// GET /api/models response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// GET /api/test-connection response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConnectionTestResponse {
    pub success: bool,
    pub message: String,
}
