//! Simulated dispatch strategy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ef_core::Role;
use ef_gateway::{ChatRequest, DispatchStrategy, GatewayError};
use tracing::trace;

use crate::fault::{FaultConfig, FaultInjector};
use crate::random::{derive_seed, DeterministicRng};

/// What the simulator will do with one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDecision {
    /// Latency before answering
    pub delay: Option<Duration>,
    /// Failure to return instead of text
    pub fault: Option<GatewayError>,
}

/// A [`DispatchStrategy`] that answers from a seed instead of the network.
///
/// Each call's fate is a pure function of the seed and the request, so
/// concurrent callers see the same outcome whatever order they arrive in.
/// Successful calls echo the model, temperature and user prompt inside an
/// HTML fragment.
pub struct SimStrategy {
    seed: u64,
    config: FaultConfig,
    calls_count: AtomicU64,
    faults_count: AtomicU64,
}

impl SimStrategy {
    pub fn new(seed: u64, config: FaultConfig) -> Self {
        Self {
            seed,
            config,
            calls_count: AtomicU64::new(0),
            faults_count: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Decide the fate of `request` without performing it.
    #[must_use]
    pub fn decide(&self, request: &ChatRequest) -> SimDecision {
        let rng = DeterministicRng::new(derive_seed(self.seed, &call_key(request)));
        let mut injector = FaultInjector::new(rng, self.config.clone());

        let delay = injector.maybe_delay();
        let fault = injector.maybe_fail();
        SimDecision { delay, fault }
    }

    /// Calls dispatched so far.
    #[must_use]
    pub fn calls_count(&self) -> u64 {
        self.calls_count.load(Ordering::SeqCst)
    }

    /// Faults returned so far.
    #[must_use]
    pub fn faults_count(&self) -> u64 {
        self.faults_count.load(Ordering::SeqCst)
    }

    /// Text a successful call returns.
    #[must_use]
    pub fn render(request: &ChatRequest) -> String {
        let user = request
            .messages()
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");
        format!(
            "<article data-model=\"{}\" data-temperature=\"{}\">{}</article>",
            request.model(),
            request.temperature(),
            user
        )
    }

    /// Format seed for error messages.
    #[must_use]
    pub fn format_seed(&self) -> String {
        format!("EF_SIM_SEED={}", self.seed)
    }
}

fn call_key(request: &ChatRequest) -> Vec<u8> {
    let mut key = Vec::new();
    key.extend_from_slice(request.model().as_bytes());
    key.extend_from_slice(&request.temperature().to_bits().to_le_bytes());
    for message in request.messages() {
        key.extend_from_slice(message.content.as_bytes());
        key.push(0);
    }
    key
}

#[async_trait]
impl DispatchStrategy for SimStrategy {
    async fn dispatch(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        self.calls_count.fetch_add(1, Ordering::SeqCst);
        let decision = self.decide(request);
        trace!(seed = self.seed, ?decision, "simulated call");

        if let Some(delay) = decision.delay {
            tokio::time::sleep(delay).await;
        }

        match decision.fault {
            Some(fault) => {
                self.faults_count.fetch_add(1, Ordering::SeqCst);
                Err(fault)
            }
            None => Ok(Self::render(request)),
        }
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ef_core::ChatMessage;

    fn request(topic: &str, temperature: f32) -> ChatRequest {
        ChatRequest::new(
            vec![ChatMessage::system("sys"), ChatMessage::user(topic)],
            "gpt-4o-mini",
            temperature,
        )
        .unwrap()
    }

    #[test]
    fn test_decide_is_pure() {
        let sim = SimStrategy::new(12345, FaultConfig::aggressive());
        for topic in ["Fractions", "Volcanoes", "Haiku"] {
            let r = request(topic, 0.7);
            assert_eq!(sim.decide(&r), sim.decide(&r));
        }
    }

    #[test]
    fn test_same_seed_same_decisions() {
        let a = SimStrategy::new(777, FaultConfig::aggressive());
        let b = SimStrategy::new(777, FaultConfig::aggressive());
        for i in 0..50 {
            let r = request(&format!("topic {}", i), 0.6);
            assert_eq!(a.decide(&r), b.decide(&r));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_follows_decision() {
        let sim = SimStrategy::new(4242, FaultConfig::aggressive());
        for i in 0..30 {
            let r = request(&format!("topic {}", i), 0.8);
            let expected = sim.decide(&r);
            let result = sim.dispatch(&r).await;
            match expected.fault {
                Some(fault) => assert_eq!(result, Err(fault)),
                None => assert_eq!(result, Ok(SimStrategy::render(&r))),
            }
        }
        assert_eq!(sim.calls_count(), 30);
    }

    #[tokio::test]
    async fn test_no_faults_echoes_prompt() {
        let sim = SimStrategy::new(1, FaultConfig::none());
        let text = sim.dispatch(&request("Photosynthesis", 0.6)).await.unwrap();
        assert!(text.contains("Photosynthesis"));
        assert!(text.contains("gpt-4o-mini"));
        assert_eq!(sim.faults_count(), 0);
    }
}
