//! The dispatch strategy seam.

use std::time::Duration;

use async_trait::async_trait;
use ef_core::ChatMessage;

use crate::error::GatewayError;
use crate::wire::{extract_error_message, ChatCompletionRequest, ChatCompletionResponse};

/// A validated model call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    messages: Vec<ChatMessage>,
    model: String,
    temperature: f32,
}

impl ChatRequest {
    /// Validate and build a call.
    ///
    /// Rejects empty message lists, blank model ids and temperatures outside `[0, 1]`.
    pub fn new(
        messages: Vec<ChatMessage>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Result<Self, GatewayError> {
        let model = model.into();

        if messages.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "At least one message is required".to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("Model must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&temperature) {
            return Err(GatewayError::InvalidRequest(format!(
                "Temperature must be in [0, 1], got {}",
                temperature
            )));
        }

        Ok(Self {
            messages,
            model,
            temperature,
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// JSON body sent over the wire.
    pub fn to_body(&self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages: self.messages.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }
}

/// How a model call reaches the provider.
///
/// Implementations must return the first choice's text and map failures to
/// [`GatewayError`]; they never retry.
#[async_trait]
pub trait DispatchStrategy: Send + Sync {
    /// Perform one call.
    async fn dispatch(&self, request: &ChatRequest) -> Result<String, GatewayError>;

    /// Strategy name for logging.
    fn name(&self) -> &'static str;
}

/// Turn an HTTP response into text or a typed failure.
///
/// Shared by both strategies so their results are indistinguishable.
pub(crate) async fn read_completion(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<String, GatewayError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| GatewayError::from_reqwest(e, timeout))?;

    if !status.is_success() {
        return Err(GatewayError::from_status(
            status.as_u16(),
            extract_error_message(&body),
        ));
    }

    let parsed: ChatCompletionResponse = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::Network(format!("Malformed completion response: {}", e)))?;
    parsed.into_first_content()
}
