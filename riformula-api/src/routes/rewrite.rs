//! Rewrite REST API Route
//!
//! POST /api/riformula - the main rewrite endpoint. Thin over the engine:
//! validation, reuse reads, generation and retries all live there.

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};

use riformula_core::RewriteResult;
use riformula_engine::RewriteOptions;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::RewriteRequest,
};

/// POST /api/riformula - Rewrite an informal activity description
#[utoipa::path(
    post,
    path = "/api/riformula",
    tag = "Rewrite",
    request_body = RewriteRequest,
    responses(
        (status = 200, description = "Rewritten description", body = RewriteResult),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 429, description = "Upstream rate limit", body = ApiError),
        (status = 502, description = "Upstream failure", body = ApiError),
        (status = 504, description = "Upstream timeout", body = ApiError),
    ),
)]
pub async fn rewrite(
    State(state): State<AppState>,
    Json(request): Json<RewriteRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.input.trim().is_empty() {
        return Err(ApiError::invalid_input(
            "Input non valido. Fornire una descrizione da riformulare.",
        ));
    }

    tracing::info!(
        input = %request.input,
        is_regeneration = request.is_regeneration,
        "rewrite request received"
    );

    let options = RewriteOptions {
        is_regeneration: request.is_regeneration,
        previous_output: request.previous_output,
    };

    let result = state.engine.rewrite(&request.input, &options).await?;

    tracing::info!(origin = ?result.origin, duration_ms = result.duration_ms, "rewrite served");
    Ok(Json(result))
}

/// Create the rewrite router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/riformula", post(rewrite))
        .with_state(state)
}
