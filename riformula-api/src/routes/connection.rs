//! Upstream Connection Test Route
//!
//! GET /api/test-connection - probes the generation service's auth
//! endpoint, distinguishing bad credentials from connectivity problems.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use crate::{state::AppState, types::ConnectionTestResponse};

/// GET /api/test-connection - Probe upstream credentials
#[utoipa::path(
    get,
    path = "/api/test-connection",
    tag = "Diagnostics",
    responses(
        (status = 200, description = "Upstream reachable", body = ConnectionTestResponse),
        (status = 502, description = "Upstream unreachable or credentials rejected", body = ConnectionTestResponse),
    ),
)]
pub async fn test_connection(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.check_upstream().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ConnectionTestResponse {
                success: true,
                message: "Connessione a OpenRouter riuscita".to_string(),
            }),
        ),
        Err(error) => {
            tracing::warn!(%error, "upstream connection test failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ConnectionTestResponse {
                    success: false,
                    message: format!("Errore di connessione a OpenRouter: {}", error),
                }),
            )
        }
    }
}

/// Create the connection-test router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/test-connection", get(test_connection))
        .with_state(state)
}
