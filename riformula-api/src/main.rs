//! Riformula API Server Entry Point
//!
//! Bootstraps configuration, opens the JSON stores, wires the OpenRouter
//! provider into the rewrite engine, spawns the snapshot scheduler and
//! starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use riformula_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use riformula_core::RewriteConfig;
use riformula_engine::{RetryPolicy, RewriteEngine};
use riformula_llm::OpenRouterGenerationProvider;
use riformula_storage::{
    JsonCorrectionStore, JsonExampleStore, JsonFeedbackStore, SnapshotScheduler,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let api_config = ApiConfig::from_env();
    let rewrite_config = RewriteConfig::from_env();
    rewrite_config
        .validate()
        .map_err(|e| ApiError::internal_error(format!("Invalid configuration: {}", e)))?;

    if !api_config.has_api_key() {
        tracing::warn!("OPENROUTER_API_KEY is not configured; rewrite requests will fail upstream");
    }

    // JSON stores, one document each, under the data directory.
    let thresholds = rewrite_config.thresholds;
    let examples = Arc::new(JsonExampleStore::open(
        api_config.data_dir.join("examples_db.json"),
    ));
    let feedback = Arc::new(JsonFeedbackStore::open(
        api_config.data_dir.join("feedback_db.json"),
        thresholds,
    ));
    let corrections = Arc::new(JsonCorrectionStore::open(
        api_config.data_dir.join("corrections_db.json"),
        thresholds,
    ));

    let provider = Arc::new(
        OpenRouterGenerationProvider::new(
            api_config.openrouter_api_key.clone(),
            rewrite_config.model.clone(),
            rewrite_config.upstream_timeout,
        )
        .with_referer(api_config.referer.clone()),
    );

    let engine = Arc::new(RewriteEngine::new(
        provider,
        examples.clone(),
        feedback.clone(),
        corrections.clone(),
        rewrite_config,
        RetryPolicy::default_policy(),
    ));

    // Snapshot scheduler: one pass at startup, then on every interval tick.
    let snapshot_task = SnapshotScheduler::new(&api_config.backup_dir, api_config.snapshot_interval)
        .register(examples)
        .register(feedback)
        .register(corrections)
        .spawn();

    let state = AppState::new(engine);
    let app: Router = create_api_router(state, &api_config);

    let addr = api_config.resolve_bind_addr()?;
    tracing::info!(%addr, "Starting Riformula API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    snapshot_task.abort();
    Ok(())
}
