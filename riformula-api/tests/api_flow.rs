//! HTTP-level tests over the assembled router, with in-memory stores and a
//! scripted generation provider behind the engine.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use riformula_api::{create_api_router, ApiConfig, AppState};
use riformula_core::RewriteConfig;
use riformula_engine::{RetryPolicy, RewriteEngine};
use riformula_llm::{GenerationProvider, ScriptedProvider};
use riformula_test_utils::{scripted_provider, StoreFixture, SAMPLE_OUTPUT};
use tower::ServiceExt;

fn test_app(provider: Arc<ScriptedProvider>, fixture: &StoreFixture) -> Router {
    let engine = Arc::new(RewriteEngine::new(
        provider as Arc<dyn GenerationProvider>,
        fixture.examples.clone(),
        fixture.feedback.clone(),
        fixture.corrections.clone(),
        RewriteConfig::default(),
        RetryPolicy::default_policy(),
    ));
    create_api_router(AppState::new(engine), &ApiConfig::default())
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn rewrite_endpoint_fresh_then_cached() {
    let provider = scripted_provider(&[SAMPLE_OUTPUT]);
    let fixture = StoreFixture::new();
    let app = test_app(provider.clone(), &fixture);

    let response = app
        .clone()
        .oneshot(json_post(
            "/api/riformula",
            serde_json::json!({ "input": "presidio zara" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["output"], SAMPLE_OUTPUT);
    assert_eq!(body["origin"], "fresh");

    let response = app
        .oneshot(json_post(
            "/api/riformula",
            serde_json::json!({ "input": "presidio zara" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["origin"], "cache");
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn rewrite_endpoint_rejects_empty_input() {
    let provider = scripted_provider(&[SAMPLE_OUTPUT]);
    let fixture = StoreFixture::new();
    let app = test_app(provider.clone(), &fixture);

    let response = app
        .oneshot(json_post(
            "/api/riformula",
            serde_json::json!({ "input": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn rewrite_endpoint_maps_upstream_auth_to_502() {
    let provider = scripted_provider(&[]);
    provider.enqueue_error(
        riformula_core::UpstreamError::InvalidApiKey {
            provider: "openrouter".to_string(),
        }
        .into(),
    );
    let fixture = StoreFixture::new();
    let app = test_app(provider, &fixture);

    let response = app
        .oneshot(json_post(
            "/api/riformula",
            serde_json::json!({ "input": "presidio zara" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UPSTREAM_AUTH");
}

#[tokio::test]
async fn rewrite_endpoint_maps_rate_limit_to_429_with_hint() {
    let provider = scripted_provider(&[]);
    provider.enqueue_error(
        riformula_core::UpstreamError::RateLimited {
            provider: "openrouter".to_string(),
            retry_after_ms: 2000,
        }
        .into(),
    );
    let fixture = StoreFixture::new();
    let app = test_app(provider, &fixture);

    let response = app
        .oneshot(json_post(
            "/api/riformula",
            serde_json::json!({ "input": "presidio zara" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["details"]["retry_after_ms"], 2000);
}

#[tokio::test]
async fn feedback_roundtrip_and_stats() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    let app = test_app(provider, &fixture);

    let response = app
        .clone()
        .oneshot(json_post(
            "/api/save-feedback",
            serde_json::json!({
                "original": "presidio zara",
                "enhanced": SAMPLE_OUTPUT,
                "is_positive": true,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let response = app.oneshot(get("/api/feedback-stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_positive"], 1);
    assert_eq!(body["total_negative"], 0);
}

#[tokio::test]
async fn feedback_missing_field_is_400() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    let app = test_app(provider, &fixture);

    let response = app
        .oneshot(json_post(
            "/api/save-feedback",
            serde_json::json!({
                "original": "",
                "enhanced": SAMPLE_OUTPUT,
                "is_positive": false,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "MISSING_FIELD");
}

#[tokio::test]
async fn correction_roundtrip_and_stats() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    let app = test_app(provider, &fixture);

    let response = app
        .clone()
        .oneshot(json_post(
            "/api/save-correction",
            serde_json::json!({
                "original_description": "presidio zara",
                "ai_generated": "Versione AI.",
                "user_corrected": "Versione corretta dall'utente.",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/correction-stats")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total_corrections"], 1);
}

#[tokio::test]
async fn models_catalog_served() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    let app = test_app(provider, &fixture);

    let response = app.oneshot(get("/api/models")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let models = body["models"].as_array().unwrap();
    assert!(models
        .iter()
        .any(|m| m["id"] == "deepseek/deepseek-r1:free"));
}

#[tokio::test]
async fn health_endpoints_respond() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    let app = test_app(provider, &fixture);

    let response = app.clone().oneshot(get("/health/ping")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/health/live")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["details"]["model"], "deepseek/deepseek-r1:free");
}

#[tokio::test]
async fn openapi_document_served() {
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    let app = test_app(provider, &fixture);

    let response = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/api/riformula"].is_object());
}

#[tokio::test]
async fn connection_test_reports_scripted_provider_ok() {
    // The scripted provider has no remote credentials to reject, so the
    // default auth probe reports success.
    let provider = scripted_provider(&[]);
    let fixture = StoreFixture::new();
    let app = test_app(provider, &fixture);

    let response = app.oneshot(get("/api/test-connection")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}
