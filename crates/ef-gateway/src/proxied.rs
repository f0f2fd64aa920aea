//! Calls relayed through the backend proxy that holds the credential.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::GatewayError;
use crate::strategy::{read_completion, ChatRequest, DispatchStrategy};

/// Posts `{messages, model, temperature}` to the proxy endpoint.
///
/// Carries no credential; the proxy adds it server-side.
pub struct ProxiedCall {
    http: reqwest::Client,
    proxy_url: String,
    timeout: Duration,
}

impl ProxiedCall {
    pub fn new(proxy_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let proxy_url = proxy_url.into();
        if proxy_url.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "Proxy URL must not be empty".to_string(),
            ));
        }
        debug_assert!(!timeout.is_zero(), "Timeout must be positive");

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            proxy_url,
            timeout,
        })
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }
}

#[async_trait]
impl DispatchStrategy for ProxiedCall {
    async fn dispatch(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        debug!(proxy = %self.proxy_url, model = request.model(), "proxied chat completion");

        let response = self
            .http
            .post(&self.proxy_url)
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, self.timeout))?;

        read_completion(response, self.timeout).await
    }

    fn name(&self) -> &'static str {
        "proxied"
    }
}
