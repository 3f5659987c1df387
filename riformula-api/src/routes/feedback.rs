//! Feedback REST API Routes
//!
//! POST /api/save-feedback and GET /api/feedback-stats. Near-duplicate
//! handling and counters live in the feedback store.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use riformula_core::FeedbackPolarity;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::{AckResponse, FeedbackRequest, FeedbackStatsResponse},
};

/// POST /api/save-feedback - Record a human judgment on a served output
#[utoipa::path(
    post,
    path = "/api/save-feedback",
    tag = "Feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback recorded", body = AckResponse),
        (status = 400, description = "Missing fields", body = ApiError),
    ),
)]
pub async fn save_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.original.trim().is_empty() {
        return Err(ApiError::missing_field("original"));
    }
    if request.enhanced.trim().is_empty() {
        return Err(ApiError::missing_field("enhanced"));
    }

    let polarity = if request.is_positive {
        FeedbackPolarity::Positive
    } else {
        FeedbackPolarity::Negative
    };

    state
        .engine
        .submit_feedback(&request.original, &request.enhanced, polarity)?;

    Ok(Json(AckResponse::ok("Feedback salvato con successo")))
}

/// GET /api/feedback-stats - Feedback counters
#[utoipa::path(
    get,
    path = "/api/feedback-stats",
    tag = "Feedback",
    responses(
        (status = 200, description = "Feedback statistics", body = FeedbackStatsResponse),
    ),
)]
pub async fn feedback_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state.engine.feedback_stats()?;
    Ok(Json(FeedbackStatsResponse { stats }))
}

/// Create the feedback router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/save-feedback", post(save_feedback))
        .route("/feedback-stats", get(feedback_stats))
        .with_state(state)
}
