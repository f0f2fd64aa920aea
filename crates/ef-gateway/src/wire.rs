//! Chat-completion wire types shared by both dispatch paths and the proxy.

use ef_core::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Fallback when a failure body carries no message.
pub const DEFAULT_FAILURE_MESSAGE: &str = "API request failed";

/// Request body for the provider and the proxy: `{messages, model, temperature}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
}

/// Provider-native chat-completion response.
///
/// Only the fields this workspace reads are modelled; the rest are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChoiceMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default = "assistant_role")]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

fn assistant_role() -> String {
    "assistant".to_string()
}

impl ChatCompletionResponse {
    /// Wrap generated text in the provider-native shape.
    pub fn from_text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: None,
            model: Some(model.into()),
            choices: vec![Choice {
                index: 0,
                message: ChoiceMessage {
                    role: assistant_role(),
                    content: Some(text.into()),
                },
                finish_reason: Some("stop".to_string()),
            }],
        }
    }

    /// Content of the first choice.
    ///
    /// A response without one cannot be used and counts as unparseable.
    pub fn into_first_content(self) -> Result<String, GatewayError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                GatewayError::Network("Response contained no message content".to_string())
            })
    }
}

/// Failure body returned by the proxy: `{error: string}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Pull a human-readable message out of a failure body.
///
/// Accepts `{error: "..."}`, the provider's `{error: {message: "..."}}` and
/// `{message: "..."}`. Anything else yields [`DEFAULT_FAILURE_MESSAGE`].
pub fn extract_error_message(body: &[u8]) -> String {
    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return DEFAULT_FAILURE_MESSAGE.to_string(),
    };

    let from_error = match value.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(obj @ serde_json::Value::Object(_)) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    };

    from_error
        .or_else(|| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
}
