//! # ef-proxy
//!
//! Server-side relay for chat completions. Holds the provider credential so
//! clients in production never see it.
//!
//! ## Endpoints
//! - `POST /api/openai` - `{messages, model, temperature}` in, provider-native
//!   chat completion out
//! - `GET /health` - Health check
//!
//! ## Failures
//!
//! Every failure body is `{"error": "<message>"}`.
//!
//! | Upstream failure        | Status |
//! |-------------------------|--------|
//! | rate limited (429)      | 429    |
//! | auth, provider, network | 502    |
//! | timeout                 | 504    |
//! | bad model/temperature   | 400    |
//! | missing credential      | 500    |

pub mod config;
pub mod routes;

use std::sync::Arc;

use tracing::info;

pub use config::{ProxyConfig, CHAT_ROUTE, DEFAULT_ALLOWED_MODELS, DEFAULT_BIND};
pub use routes::{router, status_for, ProxyState};

/// Proxy errors.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Gateway(#[from] ef_gateway::GatewayError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ProxyConfig) -> Result<(), ProxyError> {
    let state = Arc::new(ProxyState::from_config(&config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, "proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("proxy shutting down");
        })
        .await?;
    Ok(())
}
