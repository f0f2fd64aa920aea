//! # ef-sim
//!
//! Deterministic simulation of model calls.
//!
//! Replaces the network with a seeded [`SimStrategy`] so orchestration can be
//! exercised under latency and failure without a provider. All behavior is
//! reproducible from the seed.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ef_gateway::ModelGateway;
//! use ef_sim::{FaultConfig, SimStrategy};
//!
//! let seed = 12345;
//! let sim = Arc::new(SimStrategy::new(seed, FaultConfig::default()));
//! let gateway = ModelGateway::with_strategy(sim, Duration::from_secs(60));
//! assert_eq!(gateway.strategy_name(), "simulated");
//! ```
//!
//! ## Reproducibility
//!
//! Seeded tests take their base seed from [`get_or_generate_seed`] and print
//! it on failure. To reproduce a failing run:
//! ```bash
//! EF_SIM_SEED=12345 cargo test -p ef-generator seeded_simulation
//! ```

pub mod fault;
pub mod random;
pub mod strategy;

pub use fault::{FaultConfig, FaultInjector};
pub use random::{derive_seed, DeterministicRng};
pub use strategy::{SimDecision, SimStrategy};

/// Get the simulation seed from `EF_SIM_SEED` or generate a random one.
///
/// Logs the seed for reproduction.
#[must_use]
pub fn get_or_generate_seed() -> u64 {
    match std::env::var("EF_SIM_SEED").ok().and_then(|s| s.parse().ok()) {
        Some(seed) => {
            tracing::info!(seed, "EF_SIM_SEED from environment");
            seed
        }
        None => {
            let seed = rand::random::<u64>();
            tracing::info!(seed, "EF_SIM_SEED randomly generated");
            seed
        }
    }
}
