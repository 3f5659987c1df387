//! OpenRouter HTTP client with rate limiting

use super::types::ApiError;
use crate::providers::{invalid_api_key, no_response, rate_limited, request_failed};
use riformula_core::{RiformulaError, RiformulaResult, UpstreamError};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

const PROVIDER: &str = "openrouter";

/// OpenRouter API client with rate limiting and a per-request deadline.
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    referer: String,
    timeout: Duration,
    rate_limiter: Arc<Semaphore>,
    last_request: Arc<AtomicU64>,
    min_request_interval_ms: u64,
    start_time: Instant,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client.
    ///
    /// # Arguments
    /// * `api_key` - OpenRouter API key
    /// * `requests_per_minute` - Maximum requests per minute (default: 50)
    /// * `timeout` - Deadline for a single request
    pub fn new(api_key: impl Into<String>, requests_per_minute: u32, timeout: Duration) -> Self {
        let rpm = requests_per_minute.max(1);
        let permits = rpm as usize;
        let min_interval_ms = (60_000 / rpm as u64).max(10);

        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.into(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            referer: "https://riformulatore-api.onrender.com".to_string(),
            timeout,
            rate_limiter: Arc::new(Semaphore::new(permits)),
            last_request: Arc::new(AtomicU64::new(0)),
            min_request_interval_ms: min_interval_ms,
            start_time: Instant::now(),
        }
    }

    /// Override the HTTP-Referer header sent with every request.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    /// Make an API request with automatic rate limiting.
    pub async fn request<Req: Serialize, Res: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Req,
    ) -> RiformulaResult<Res> {
        // Rate limiting: acquire permit
        let _permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| request_failed(PROVIDER, 0, format!("Rate limiter error: {}", e)))?;

        // Enforce minimum interval between requests
        let now_ms = self.start_time.elapsed().as_millis() as u64;
        let last_ms = self.last_request.load(Ordering::Relaxed);
        let elapsed = now_ms.saturating_sub(last_ms);

        if elapsed < self.min_request_interval_ms {
            let wait_ms = self.min_request_interval_ms - elapsed;
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        }

        self.last_request.store(now_ms, Ordering::Relaxed);

        // Make HTTP request
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.trim()))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", "Riformulatore Descrizioni Tecniche")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        // Handle response
        let status = response.status();
        let retry_after_ms = parse_retry_after_ms(response.headers()).unwrap_or(0);

        if status.is_success() {
            response.json().await.map_err(|e| {
                RiformulaError::Upstream(UpstreamError::MalformedResponse {
                    provider: PROVIDER.to_string(),
                    reason: format!("Failed to parse response: {}", e),
                })
            })
        } else {
            // Parse error response
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let error_msg = if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                api_error.error.message
            } else {
                error_text
            };

            Err(match status {
                StatusCode::TOO_MANY_REQUESTS => rate_limited(PROVIDER, retry_after_ms),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => invalid_api_key(PROVIDER),
                _ => request_failed(PROVIDER, status.as_u16() as i32, error_msg),
            })
        }
    }

    /// Probe the upstream auth endpoint; distinguishes a configured-but-bad
    /// key from connectivity problems.
    pub async fn auth_check(&self) -> RiformulaResult<()> {
        let url = format!("{}/auth/key", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.trim()))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        match status {
            _ if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(invalid_api_key(PROVIDER)),
            _ => Err(request_failed(
                PROVIDER,
                status.as_u16() as i32,
                "auth key check failed",
            )),
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> RiformulaError {
        if error.is_timeout() {
            RiformulaError::Upstream(UpstreamError::Timeout {
                provider: PROVIDER.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })
        } else {
            no_response(PROVIDER, format!("HTTP request failed: {}", error))
        }
    }
}

fn parse_retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<i64> {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<f64>().ok())
        .map(|seconds| (seconds * 1000.0) as i64)
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}
