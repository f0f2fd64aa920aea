//! The model gateway: one strategy, one timeout, one pre-flight check.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ef_core::ChatMessage;
use tracing::{debug, warn};

use crate::config::{DeploymentMode, GatewayConfig};
use crate::direct::DirectCall;
use crate::error::GatewayError;
use crate::proxied::ProxiedCall;
use crate::strategy::{ChatRequest, DispatchStrategy};

/// Single chokepoint for model calls.
///
/// The strategy is fixed at construction; `call` never re-reads the
/// environment.
#[derive(Clone)]
pub struct ModelGateway {
    strategy: Option<Arc<dyn DispatchStrategy>>,
    call_timeout: Duration,
}

impl ModelGateway {
    /// Select the strategy for `config`.
    ///
    /// Development with a usable key calls the provider directly; production
    /// goes through the proxy. Development without a key builds a gateway
    /// whose every call fails with `Configuration`.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let strategy: Option<Arc<dyn DispatchStrategy>> = match config.mode {
            DeploymentMode::Production => Some(Arc::new(ProxiedCall::new(
                config.proxy_url.clone(),
                config.call_timeout,
            )?)),
            DeploymentMode::Development => match config.usable_key() {
                Some(key) => Some(Arc::new(DirectCall::new(
                    key.clone(),
                    &config.provider_base_url,
                    config.call_timeout,
                )?)),
                None => {
                    warn!("no usable OPENAI_API_KEY in development mode; model calls will fail");
                    None
                }
            },
        };

        Ok(Self {
            strategy,
            call_timeout: config.call_timeout,
        })
    }

    /// Build around an explicit strategy.
    pub fn with_strategy(strategy: Arc<dyn DispatchStrategy>, call_timeout: Duration) -> Self {
        debug_assert!(!call_timeout.is_zero(), "Timeout must be positive");
        Self {
            strategy: Some(strategy),
            call_timeout,
        }
    }

    /// A gateway with no credential, for wiring tests and dry runs.
    pub fn unconfigured() -> Self {
        Self {
            strategy: None,
            call_timeout: crate::config::DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Whether calls can be attempted at all.
    ///
    /// Lets callers show a message up front instead of firing doomed requests.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.strategy.is_some()
    }

    /// Name of the active strategy, `"unconfigured"` if none.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.as_ref().map_or("unconfigured", |s| s.name())
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Send `messages` to `model` and return the generated text.
    pub async fn call(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        temperature: f32,
    ) -> Result<String, GatewayError> {
        let strategy = self.strategy.as_ref().ok_or_else(|| {
            GatewayError::Configuration(
                "Please configure your OpenAI API key. Set OPENAI_API_KEY to your actual API key."
                    .to_string(),
            )
        })?;
        let request = ChatRequest::new(messages, model, temperature)?;

        let start = Instant::now();
        let result = match tokio::time::timeout(self.call_timeout, strategy.dispatch(&request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Cancelled {
                after: self.call_timeout,
            }),
        };

        match &result {
            Ok(text) => debug!(
                strategy = strategy.name(),
                model,
                elapsed_ms = start.elapsed().as_millis() as u64,
                chars = text.len(),
                "model call succeeded"
            ),
            Err(e) => warn!(
                strategy = strategy.name(),
                model,
                elapsed_ms = start.elapsed().as_millis() as u64,
                kind = e.kind().name(),
                error = %e,
                "model call failed"
            ),
        }

        result
    }
}

impl std::fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGateway")
            .field("strategy", &self.strategy_name())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}
