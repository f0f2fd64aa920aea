//! Proxy configuration.

use std::net::SocketAddr;

use ef_core::DEFAULT_MODEL;
use ef_gateway::{DeploymentMode, GatewayConfig, GatewayError};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Route the client posts chat requests to.
pub const CHAT_ROUTE: &str = "/api/openai";

/// Models the proxy will forward by default.
pub const DEFAULT_ALLOWED_MODELS: [&str; 3] = [DEFAULT_MODEL, "gpt-4o", "gpt-3.5-turbo"];

/// Proxy configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Upstream settings; always development mode with a usable key
    pub gateway: GatewayConfig,
    /// Models clients may request
    pub allowed_models: Vec<String>,
}

impl ProxyConfig {
    /// Config forwarding to the provider with `api_key`.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_gateway(GatewayConfig::development(api_key), default_bind()?)
    }

    /// Load from process environment variables.
    ///
    /// - `OPENAI_API_KEY`: provider credential (required)
    /// - `OPENAI_BASE_URL`: provider base URL
    /// - `EDUFORGE_CALL_TIMEOUT_SECS`: per-call timeout in seconds
    /// - `EDUFORGE_PROXY_BIND`: listen address
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // The proxy itself never relays to another proxy.
        let gateway = GatewayConfig::from_lookup(|key| match key {
            "EDUFORGE_ENV" => None,
            _ => lookup(key),
        })?;

        let bind = match lookup("EDUFORGE_PROXY_BIND") {
            Some(addr) => parse_bind(&addr)?,
            None => default_bind()?,
        };

        Self::with_gateway(gateway, bind)
    }

    fn with_gateway(mut gateway: GatewayConfig, bind: SocketAddr) -> Result<Self, GatewayError> {
        gateway.mode = DeploymentMode::Development;
        if !gateway.is_credential_configured() {
            return Err(GatewayError::Configuration(
                "OPENAI_API_KEY must be set for the proxy".to_string(),
            ));
        }

        Ok(Self {
            bind,
            gateway,
            allowed_models: DEFAULT_ALLOWED_MODELS.iter().map(|m| m.to_string()).collect(),
        })
    }
}

fn default_bind() -> Result<SocketAddr, GatewayError> {
    parse_bind(DEFAULT_BIND)
}

fn parse_bind(addr: &str) -> Result<SocketAddr, GatewayError> {
    addr.trim().parse().map_err(|_| {
        GatewayError::Configuration(format!(
            "EDUFORGE_PROXY_BIND must be host:port, got '{}'",
            addr
        ))
    })
}
