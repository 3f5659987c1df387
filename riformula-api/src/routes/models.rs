//! Model Catalog Route
//!
//! GET /api/models - the fixed list of selectable upstream models shown by
//! the frontend.

use axum::{response::IntoResponse, routing::get, Json, Router};

use crate::types::{ModelInfo, ModelsResponse};

fn catalog() -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            id: "deepseek/deepseek-r1:free".to_string(),
            name: "DeepSeek R1 (Gratuito)".to_string(),
            free: true,
        },
        ModelInfo {
            id: "meta-llama/llama-3-8b:free".to_string(),
            name: "Llama 3 8B (Gratuito)".to_string(),
            free: true,
        },
        ModelInfo {
            id: "google/gemma-7b-it:free".to_string(),
            name: "Gemma 7B (Gratuito)".to_string(),
            free: true,
        },
        ModelInfo {
            id: "gpt-3.5-turbo".to_string(),
            name: "GPT-3.5 Turbo".to_string(),
            free: false,
        },
    ]
}

/// GET /api/models - List selectable models
#[utoipa::path(
    get,
    path = "/api/models",
    tag = "Models",
    responses(
        (status = 200, description = "Available models", body = ModelsResponse),
    ),
)]
pub async fn list_models() -> impl IntoResponse {
    Json(ModelsResponse { models: catalog() })
}

/// Create the models router.
pub fn create_router() -> Router {
    Router::new().route("/models", get(list_models))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contains_default_model() {
        let models = catalog();
        assert!(models
            .iter()
            .any(|m| m.id == "deepseek/deepseek-r1:free" && m.free));
    }

    #[test]
    fn test_catalog_marks_paid_models() {
        let models = catalog();
        let paid = models.iter().find(|m| m.id == "gpt-3.5-turbo").unwrap();
        assert!(!paid.free);
    }
}
