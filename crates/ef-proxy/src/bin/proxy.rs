//! Run the chat-completion relay.
//!
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run -p ef-proxy --bin ef-proxy
//! EDUFORGE_PROXY_BIND=0.0.0.0:8080 cargo run -p ef-proxy --bin ef-proxy
//! ```

use std::process::ExitCode;

use ef_proxy::ProxyConfig;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ProxyConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Make sure OPENAI_API_KEY is set:");
            eprintln!("  export OPENAI_API_KEY=sk-...");
            return ExitCode::FAILURE;
        }
    };

    match ef_proxy::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "proxy stopped");
            ExitCode::FAILURE
        }
    }
}
