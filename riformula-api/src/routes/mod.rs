//! REST API Routes Module
//!
//! All route handlers for the rewrite service:
//! - Rewrite endpoint (the main path)
//! - Feedback and correction submission + statistics
//! - Model catalog and upstream diagnostics
//! - Health check endpoints (Kubernetes-compatible)
//! - CORS support for the browser frontend

pub mod connection;
pub mod correction;
pub mod feedback;
pub mod health;
pub mod models;
pub mod rewrite;

use axum::{response::IntoResponse, routing::get, Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ApiConfig;
use crate::state::AppState;

// Re-export route creation functions for convenience
pub use connection::create_router as connection_router;
pub use correction::create_router as correction_router;
pub use feedback::create_router as feedback_router;
pub use health::create_router as health_router;
pub use models::create_router as models_router;
pub use rewrite::create_router as rewrite_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(crate::openapi::ApiDoc::document())
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Build the CORS layer: permissive in dev, an explicit origin list in
/// production.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Create the complete API router.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let api = Router::new()
        .merge(rewrite_router(state.clone()))
        .merge(feedback_router(state.clone()))
        .merge(correction_router(state.clone()))
        .merge(connection_router(state.clone()))
        .merge(models_router());

    Router::new()
        .nest("/api", api)
        .nest("/health", health_router(state))
        .route("/openapi.json", get(openapi_json))
        .layer(cors_layer(config))
}
