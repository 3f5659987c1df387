//! OpenRouter generation provider implementation

use super::client::OpenRouterClient;
use super::types::{ChatRequest, ChatResponse, Message};
use crate::providers::malformed_response;
use crate::{GenerationProvider, GenerationRequest, FEW_SHOT_EXAMPLES};
use async_trait::async_trait;
use riformula_core::{RiformulaError, RiformulaResult, UpstreamError};
use std::time::Duration;

/// Generation provider backed by the OpenRouter chat-completions API.
pub struct OpenRouterGenerationProvider {
    client: OpenRouterClient,
    model: String,
}

impl OpenRouterGenerationProvider {
    /// Create a new OpenRouter generation provider.
    ///
    /// # Arguments
    /// * `api_key` - OpenRouter API key
    /// * `model` - Model name (e.g., "deepseek/deepseek-r1:free")
    /// * `timeout` - Deadline for a single generation call
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: OpenRouterClient::new(api_key, 50, timeout),
            model: model.into(),
        }
    }

    /// Override the HTTP-Referer forwarded upstream.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.client = self.client.with_referer(referer);
        self
    }

    fn build_messages(&self, request: &GenerationRequest) -> Vec<Message> {
        let mut messages = Vec::with_capacity(FEW_SHOT_EXAMPLES.len() * 2 + 2);
        messages.push(Message::system(request.system_prompt.clone()));
        for (informal, formal) in FEW_SHOT_EXAMPLES {
            messages.push(Message::user(*informal));
            messages.push(Message::assistant(*formal));
        }
        messages.push(Message::user(request.user_input.clone()));
        messages
    }
}

#[async_trait]
impl GenerationProvider for OpenRouterGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> RiformulaResult<String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: self.build_messages(request),
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
            top_p: request.params.top_p,
            frequency_penalty: request.params.frequency_penalty,
            presence_penalty: request.params.presence_penalty,
            stop: vec!["User:".to_string(), "System:".to_string()],
        };

        let response: ChatResponse = self
            .client
            .request("chat/completions", body)
            .await
            .map_err(|error| self.remap_model_not_found(error))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.extract_text())
            .ok_or_else(|| malformed_response("openrouter", "no completion in any known field"))
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn auth_check(&self) -> RiformulaResult<()> {
        self.client.auth_check().await
    }
}

impl OpenRouterGenerationProvider {
    /// A 404 on chat-completions means the requested model is unknown or
    /// unavailable; only this provider knows which model that was.
    fn remap_model_not_found(&self, error: RiformulaError) -> RiformulaError {
        match error {
            RiformulaError::Upstream(UpstreamError::RequestFailed { status: 404, .. }) => {
                RiformulaError::Upstream(UpstreamError::ModelNotFound {
                    model: self.model.clone(),
                })
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for OpenRouterGenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterGenerationProvider")
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PromptBuilder, SamplingParams};

    fn provider() -> OpenRouterGenerationProvider {
        OpenRouterGenerationProvider::new("sk-test", "deepseek/deepseek-r1:free", Duration::from_secs(60))
    }

    #[test]
    fn test_messages_interleave_few_shot_pairs() {
        let request = GenerationRequest {
            system_prompt: PromptBuilder::new().system_prompt(),
            user_input: "presidio zara".to_string(),
            params: SamplingParams::base(),
        };

        let messages = provider().build_messages(&request);

        // system + 3 user/assistant pairs + final user message
        assert_eq!(messages.len(), 8);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[7].role, "user");
        assert_eq!(messages[7].content, "presidio zara");
    }

    #[test]
    fn test_remap_converts_404_only() {
        let p = provider();

        let not_found = RiformulaError::Upstream(UpstreamError::RequestFailed {
            provider: "openrouter".to_string(),
            status: 404,
            message: "no such model".to_string(),
        });
        assert!(matches!(
            p.remap_model_not_found(not_found),
            RiformulaError::Upstream(UpstreamError::ModelNotFound { model }) if model == "deepseek/deepseek-r1:free"
        ));

        let server_error = RiformulaError::Upstream(UpstreamError::RequestFailed {
            provider: "openrouter".to_string(),
            status: 500,
            message: "boom".to_string(),
        });
        assert!(matches!(
            p.remap_model_not_found(server_error),
            RiformulaError::Upstream(UpstreamError::RequestFailed { status: 500, .. })
        ));
    }

    #[test]
    fn test_model_id_reported() {
        assert_eq!(provider().model_id(), "deepseek/deepseek-r1:free");
    }
}
