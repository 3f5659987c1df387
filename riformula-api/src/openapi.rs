//! OpenAPI Specification for the Riformula API
//!
//! This module defines the OpenAPI document for the REST API. It uses
//! utoipa to generate the specification from Rust types and route
//! annotations.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::types::{
    AckResponse, ConnectionTestResponse, CorrectionRequest, CorrectionStatsResponse,
    FeedbackRequest, FeedbackStatsResponse, ModelInfo, ModelsResponse, RewriteRequest,
};

// Import route modules for path references
use crate::routes::{connection, correction, feedback, health, models, rewrite};

// Import domain types from riformula-core
use riformula_core::{CorrectionStats, FeedbackStats, Origin, RewriteResult};

/// OpenAPI document for the Riformula API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Riformula API",
        version = "0.3.0",
        description = "Rewrites informal Italian IT activity descriptions into formal professional sentences, with a similarity-based learning layer over an external generation service",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Rewrite", description = "The main rewrite endpoint"),
        (name = "Feedback", description = "Human judgments on served outputs"),
        (name = "Corrections", description = "User rewrites of AI outputs"),
        (name = "Models", description = "Upstream model catalog"),
        (name = "Diagnostics", description = "Upstream connectivity probes"),
        (name = "Health", description = "Liveness and readiness endpoints")
    ),
    paths(
        rewrite::rewrite,
        feedback::save_feedback,
        feedback::feedback_stats,
        correction::save_correction,
        correction::correction_stats,
        models::list_models,
        connection::test_connection,
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(schemas(
        // API types
        RewriteRequest,
        FeedbackRequest,
        FeedbackStatsResponse,
        CorrectionRequest,
        CorrectionStatsResponse,
        AckResponse,
        ModelInfo,
        ModelsResponse,
        ConnectionTestResponse,
        ApiError,
        ErrorCode,
        // Health types
        health::HealthResponse,
        health::HealthStatus,
        health::HealthDetails,
        health::ComponentHealth,
        // Domain types
        RewriteResult,
        Origin,
        FeedbackStats,
        CorrectionStats,
    ))
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Build the OpenAPI document.
    pub fn document() -> utoipa::openapi::OpenApi {
        Self::openapi()
    }
}
