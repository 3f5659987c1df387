//! OpenRouter chat-completions request and response types

use serde::{Deserialize, Serialize};

// ============================================================================
// REQUEST TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: i32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    /// Stops the model from continuing past the rewritten sentence.
    pub stop: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One completion choice.
///
/// Models routed through OpenRouter disagree on which field carries the
/// completion text, so every observed variant is modeled and extraction
/// tries them in a fixed order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl Choice {
    /// Extract the completion text: `message.content`, then `text`, then
    /// `content`. Whitespace-only candidates are treated as absent.
    pub fn extract_text(&self) -> Option<String> {
        let candidates = [
            self.message.as_ref().and_then(|m| m.content.as_deref()),
            self.text.as_deref(),
            self.content.as_deref(),
        ];

        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default)]
    pub code: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_prefers_message_content() {
        let choice: Choice = serde_json::from_str(
            r#"{"message": {"content": "Dal messaggio."}, "text": "Dal campo text."}"#,
        )
        .unwrap();
        assert_eq!(choice.extract_text().unwrap(), "Dal messaggio.");
    }

    #[test]
    fn test_extract_text_falls_back_to_text_field() {
        let choice: Choice =
            serde_json::from_str(r#"{"text": "  Dal campo text.  "}"#).unwrap();
        assert_eq!(choice.extract_text().unwrap(), "Dal campo text.");
    }

    #[test]
    fn test_extract_text_falls_back_to_content_field() {
        let choice: Choice = serde_json::from_str(r#"{"content": "Dal campo content."}"#).unwrap();
        assert_eq!(choice.extract_text().unwrap(), "Dal campo content.");
    }

    #[test]
    fn test_extract_text_skips_blank_candidates() {
        let choice: Choice = serde_json::from_str(
            r#"{"message": {"content": "   "}, "text": "Utilizzabile."}"#,
        )
        .unwrap();
        assert_eq!(choice.extract_text().unwrap(), "Utilizzabile.");
    }

    #[test]
    fn test_extract_text_none_when_empty() {
        let choice: Choice = serde_json::from_str(r#"{}"#).unwrap();
        assert!(choice.extract_text().is_none());
    }

    #[test]
    fn test_chat_response_tolerates_missing_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.choices.is_empty());
    }
}
