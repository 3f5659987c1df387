//! Shared application state for Axum routers.

use std::sync::Arc;

use riformula_engine::RewriteEngine;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The rewrite orchestrator; owns provider, stores and cache.
    pub engine: Arc<RewriteEngine>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(engine: Arc<RewriteEngine>) -> Self {
        Self {
            engine,
            start_time: std::time::Instant::now(),
        }
    }
}
