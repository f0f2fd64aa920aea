//! Deterministic fault injection for model calls.
//!
//! Simulates the ways a chat-completion call goes wrong:
//! - Rate limiting and upstream errors (provider failures)
//! - Rejected credentials (auth failures)
//! - Dropped connections (network failures)
//! - Latency

use std::time::Duration;

use ef_gateway::GatewayError;

use crate::random::DeterministicRng;

/// Configuration for fault injection.
#[derive(Debug, Clone)]
pub struct FaultConfig {
    /// Probability that a call fails (0.0 to 1.0)
    pub failure_probability: f64,
    /// Probability of injecting latency
    pub delay_probability: f64,
    /// Maximum injected latency in milliseconds
    pub delay_ms_max: u64,
    /// Whether fault injection is enabled
    pub enabled: bool,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            failure_probability: 0.1,  // 10% chance
            delay_probability: 0.5,    // 50% chance
            delay_ms_max: 2_000,       // 2s max delay
            enabled: true,
        }
    }
}

impl FaultConfig {
    /// No faults, no latency.
    #[must_use]
    pub fn none() -> Self {
        Self {
            failure_probability: 0.0,
            delay_probability: 0.0,
            delay_ms_max: 0,
            enabled: false,
        }
    }

    /// Aggressive faults for stress testing.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            failure_probability: 0.4,
            delay_probability: 0.8,
            delay_ms_max: 10_000,
            enabled: true,
        }
    }

    /// Every call fails.
    #[must_use]
    pub fn always_fail() -> Self {
        Self {
            failure_probability: 1.0,
            delay_probability: 0.0,
            delay_ms_max: 0,
            enabled: true,
        }
    }

    /// Only latency, no failures.
    #[must_use]
    pub fn delays_only() -> Self {
        Self {
            failure_probability: 0.0,
            delay_probability: 1.0,
            delay_ms_max: 5_000,
            enabled: true,
        }
    }
}

/// Failures the injector picks from, uniformly.
fn fault_menu() -> [GatewayError; 4] {
    [
        GatewayError::Provider {
            status: 429,
            message: "rate limited".to_string(),
        },
        GatewayError::Provider {
            status: 500,
            message: "upstream error".to_string(),
        },
        GatewayError::Auth {
            status: 401,
            message: "invalid api key".to_string(),
        },
        GatewayError::Network("connection reset by peer".to_string()),
    ]
}

/// Deterministic fault injector.
///
/// The same seed produces the same fault sequence.
pub struct FaultInjector {
    rng: DeterministicRng,
    config: FaultConfig,
}

impl FaultInjector {
    pub fn new(rng: DeterministicRng, config: FaultConfig) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&config.failure_probability),
            "Failure probability must be in [0.0, 1.0]"
        );
        debug_assert!(
            (0.0..=1.0).contains(&config.delay_probability),
            "Delay probability must be in [0.0, 1.0]"
        );

        Self { rng, config }
    }

    /// Failure to inject, if any.
    pub fn maybe_fail(&mut self) -> Option<GatewayError> {
        if !self.config.enabled {
            return None;
        }

        if self.rng.gen_bool(self.config.failure_probability) {
            let menu = fault_menu();
            self.rng.choose(&menu).cloned()
        } else {
            None
        }
    }

    /// Latency to inject, if any.
    pub fn maybe_delay(&mut self) -> Option<Duration> {
        if !self.config.enabled || self.config.delay_ms_max == 0 {
            return None;
        }

        if self.rng.gen_bool(self.config.delay_probability) {
            Some(Duration::from_millis(
                self.rng.gen_range(1..=self.config.delay_ms_max),
            ))
        } else {
            None
        }
    }

    #[must_use]
    pub fn config(&self) -> &FaultConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_faults_when_disabled() {
        let mut injector = FaultInjector::new(DeterministicRng::new(12345), FaultConfig::none());

        for _ in 0..1000 {
            assert!(injector.maybe_fail().is_none());
            assert!(injector.maybe_delay().is_none());
        }
    }

    #[test]
    fn test_deterministic_faults() {
        let mut inj1 = FaultInjector::new(DeterministicRng::new(42), FaultConfig::aggressive());
        let mut inj2 = FaultInjector::new(DeterministicRng::new(42), FaultConfig::aggressive());

        for _ in 0..100 {
            assert_eq!(inj1.maybe_fail(), inj2.maybe_fail());
            assert_eq!(inj1.maybe_delay(), inj2.maybe_delay());
        }
    }

    #[test]
    fn test_always_fail() {
        let mut injector = FaultInjector::new(DeterministicRng::new(99), FaultConfig::always_fail());
        for _ in 0..50 {
            assert!(injector.maybe_fail().is_some());
        }
    }

    #[test]
    fn test_delay_bounds() {
        let mut injector = FaultInjector::new(DeterministicRng::new(7), FaultConfig::delays_only());
        for _ in 0..100 {
            let delay = injector.maybe_delay().unwrap();
            assert!(delay >= Duration::from_millis(1));
            assert!(delay <= Duration::from_millis(5_000));
        }
    }
}
