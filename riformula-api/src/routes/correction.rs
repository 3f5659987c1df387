//! Correction REST API Routes
//!
//! POST /api/save-correction and GET /api/correction-stats.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::{AckResponse, CorrectionRequest, CorrectionStatsResponse},
};

/// POST /api/save-correction - Record a user rewrite of an AI output
#[utoipa::path(
    post,
    path = "/api/save-correction",
    tag = "Corrections",
    request_body = CorrectionRequest,
    responses(
        (status = 200, description = "Correction recorded", body = AckResponse),
        (status = 400, description = "Missing fields", body = ApiError),
    ),
)]
pub async fn save_correction(
    State(state): State<AppState>,
    Json(request): Json<CorrectionRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.original_description.trim().is_empty() {
        return Err(ApiError::missing_field("original_description"));
    }
    if request.ai_generated.trim().is_empty() {
        return Err(ApiError::missing_field("ai_generated"));
    }
    if request.user_corrected.trim().is_empty() {
        return Err(ApiError::missing_field("user_corrected"));
    }

    state.engine.submit_correction(
        &request.original_description,
        &request.ai_generated,
        &request.user_corrected,
    )?;

    Ok(Json(AckResponse::ok("Correzione salvata con successo")))
}

/// GET /api/correction-stats - Correction and request counters
#[utoipa::path(
    get,
    path = "/api/correction-stats",
    tag = "Corrections",
    responses(
        (status = 200, description = "Correction statistics", body = CorrectionStatsResponse),
    ),
)]
pub async fn correction_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state.engine.correction_stats()?;
    Ok(Json(CorrectionStatsResponse { stats }))
}

/// Create the correction router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/save-correction", post(save_correction))
        .route("/correction-stats", get(correction_stats))
        .with_state(state)
}
