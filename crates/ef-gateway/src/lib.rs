//! # ef-gateway
//!
//! The single chokepoint between the generators and the model provider.
//!
//! ## Dispatch
//!
//! A [`ModelGateway`] owns exactly one [`DispatchStrategy`], chosen once at
//! construction from a [`GatewayConfig`]:
//!
//! | Deployment | Local credential | Strategy |
//! |------------|------------------|----------|
//! | development | usable | [`DirectCall`] to the provider |
//! | development | missing/placeholder | none, calls fail with `Configuration` |
//! | production | ignored | [`ProxiedCall`] to the backend relay |
//!
//! Both strategies return the text of the first choice of a provider-native
//! chat-completion response, so callers never know which path ran.
//!
//! ```text
//! messages ──> ModelGateway ──┬──> DirectCall  ──> POST {base}/chat/completions
//!                             └──> ProxiedCall ──> POST /api/openai
//! ```
//!
//! There are no retries. Each call is bounded by `call_timeout`; expiry is
//! reported as [`GatewayError::Cancelled`].

pub mod config;
pub mod direct;
pub mod error;
pub mod gateway;
pub mod proxied;
pub mod strategy;
pub mod wire;

pub use config::{Credential, DeploymentMode, GatewayConfig};
pub use direct::DirectCall;
pub use error::{ErrorKind, GatewayError};
pub use gateway::ModelGateway;
pub use proxied::ProxiedCall;
pub use strategy::{ChatRequest, DispatchStrategy};
pub use wire::{ChatCompletionRequest, ChatCompletionResponse, ErrorBody};
