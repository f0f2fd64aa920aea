//! Gateway configuration and credential handling.

use std::str::FromStr;
use std::time::Duration;

use crate::error::GatewayError;

/// Placeholder shipped in example `.env` files. Treated as no key at all.
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

/// Default provider base URL (OpenAI-compatible).
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.openai.com/v1";

/// Default backend relay endpoint.
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8787/api/openai";

/// Default per-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the code is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    /// Local development: a local credential may be used directly
    #[default]
    Development,
    /// Deployed: the credential lives only behind the proxy
    Production,
}

impl FromStr for DeploymentMode {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(DeploymentMode::Development),
            "production" | "prod" => Ok(DeploymentMode::Production),
            other => Err(GatewayError::Configuration(format!(
                "Unknown EDUFORGE_ENV '{}'. Valid values: development, production",
                other
            ))),
        }
    }
}

/// Provider API key.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Whether this looks like a real key rather than a blank or placeholder.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        let key = self.0.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }

    /// Raw secret, for the `Authorization` header only.
    pub(crate) fn expose(&self) -> &str {
        self.0.trim()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Deployment context
    pub mode: DeploymentMode,
    /// Local provider key (development only)
    pub api_key: Option<Credential>,
    /// Provider base URL for direct calls
    pub provider_base_url: String,
    /// Backend relay endpoint for proxied calls
    pub proxy_url: String,
    /// Upper bound on a single model call
    pub call_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::Development,
            api_key: None,
            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Development config calling the provider directly with `api_key`.
    pub fn development(api_key: impl Into<String>) -> Self {
        Self {
            mode: DeploymentMode::Development,
            api_key: Some(Credential::new(api_key)),
            ..Default::default()
        }
    }

    /// Production config relaying through `proxy_url`.
    pub fn production(proxy_url: impl Into<String>) -> Self {
        Self {
            mode: DeploymentMode::Production,
            api_key: None,
            proxy_url: proxy_url.into(),
            ..Default::default()
        }
    }

    /// Load from process environment variables.
    ///
    /// - `EDUFORGE_ENV`: `development` (default) or `production`
    /// - `OPENAI_API_KEY`: local credential
    /// - `OPENAI_BASE_URL`: provider base URL
    /// - `EDUFORGE_PROXY_URL`: proxy endpoint
    /// - `EDUFORGE_CALL_TIMEOUT_SECS`: per-call timeout in seconds
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(mode) = lookup("EDUFORGE_ENV") {
            config.mode = mode.parse()?;
        }
        config.api_key = lookup("OPENAI_API_KEY").map(Credential::new);
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            config.provider_base_url = url;
        }
        if let Some(url) = lookup("EDUFORGE_PROXY_URL") {
            config.proxy_url = url;
        }
        if let Some(secs) = lookup("EDUFORGE_CALL_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                GatewayError::Configuration(format!(
                    "EDUFORGE_CALL_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    secs
                ))
            })?;
            config = config.with_call_timeout_secs(secs)?;
        }

        Ok(config)
    }

    /// Set the per-call timeout. Zero is rejected rather than ignored.
    pub fn with_call_timeout_secs(mut self, secs: u64) -> Result<Self, GatewayError> {
        if secs == 0 {
            return Err(GatewayError::Configuration(
                "call timeout must be a positive number of seconds".to_string(),
            ));
        }
        self.call_timeout = Duration::from_secs(secs);
        Ok(self)
    }

    /// Whether a call can be attempted at all.
    ///
    /// Production always answers yes: the proxy holds the key.
    #[must_use]
    pub fn is_credential_configured(&self) -> bool {
        match self.mode {
            DeploymentMode::Production => true,
            DeploymentMode::Development => self.usable_key().is_some(),
        }
    }

    pub(crate) fn usable_key(&self) -> Option<&Credential> {
        self.api_key.as_ref().filter(|k| k.is_usable())
    }
}
