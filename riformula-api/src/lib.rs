//! Riformula API - REST layer
//!
//! Axum HTTP surface over the rewrite engine: the rewrite endpoint,
//! feedback/correction submission, statistics, model catalog, upstream
//! diagnostics and health checks.

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
