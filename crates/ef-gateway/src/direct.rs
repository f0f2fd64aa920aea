//! Direct calls to the provider's chat-completion endpoint.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Credential;
use crate::error::GatewayError;
use crate::strategy::{read_completion, ChatRequest, DispatchStrategy};

/// Calls `{base_url}/chat/completions` with a bearer credential.
///
/// Only for contexts that may hold the key: local development and the proxy
/// itself.
pub struct DirectCall {
    http: reqwest::Client,
    credential: Credential,
    endpoint: String,
    timeout: Duration,
}

impl DirectCall {
    /// Create a direct caller.
    ///
    /// Fails with `Configuration` when the credential is blank or a placeholder.
    pub fn new(
        credential: Credential,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        if !credential.is_usable() {
            return Err(GatewayError::Configuration(
                "OPENAI_API_KEY is missing or still set to the placeholder value".to_string(),
            ));
        }
        debug_assert!(!timeout.is_zero(), "Timeout must be positive");

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            credential,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    /// Full chat-completion URL this caller posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DispatchStrategy for DirectCall {
    async fn dispatch(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        debug!(endpoint = %self.endpoint, model = request.model(), "direct chat completion");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.credential.expose())
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, self.timeout))?;

        read_completion(response, self.timeout).await
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}
