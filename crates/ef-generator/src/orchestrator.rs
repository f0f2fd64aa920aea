//! Concurrent fan-out of the three primary generations.
//!
//! ```text
//!                 ┌──► lesson     ──┐
//!  request ──►────┼──► activities ──┼──► join ──► outcome ──► sink
//!   (validate,    └──► quiz       ──┘
//!    ready?)
//! ```
//!
//! | Policy       | Join ends when        | Failed outcome keeps |
//! |--------------|-----------------------|----------------------|
//! | `FailFast`   | first failure         | nothing              |
//! | `AllSettled` | all three have ended  | the texts that succeeded |
//!
//! Under fail-fast the remaining tasks are not cancelled; they run to
//! completion in the background and their results are dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use ef_core::{ContentKind, GenerationRequest};
use ef_gateway::GatewayError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, info_span, warn, Instrument};

use crate::content::{ContentSource, GenerationError};
use crate::outcome::{GenerationOutcome, OutcomeStatus};
use crate::sink::ContentSink;

/// How the three generations are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinPolicy {
    #[default]
    FailFast,
    AllSettled,
}

/// Lifecycle of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    Running,
    Complete,
    Failed,
}

impl OrchestratorState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrchestratorState::Complete | OrchestratorState::Failed)
    }
}

/// Orchestrator errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestratorError {
    #[error("A generation is already running")]
    AlreadyRunning,
}

/// Runs lesson, activities and quiz generation concurrently.
///
/// One run at a time; a second `run` while one is in flight is rejected.
pub struct Orchestrator {
    source: Arc<dyn ContentSource>,
    policy: JoinPolicy,
    state: Mutex<OrchestratorState>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            policy: JoinPolicy::default(),
            state: Mutex::new(OrchestratorState::Idle),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: JoinPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> JoinPolicy {
        self.policy
    }

    #[must_use]
    pub fn state(&self) -> OrchestratorState {
        *lock(&self.state)
    }

    /// Run without a presentation sink.
    pub async fn run(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, OrchestratorError> {
        self.run_into(request, &mut Discard).await
    }

    /// Run and attach the fragments to `sink`.
    ///
    /// Fragments are attached only after the join; under fail-fast a failed
    /// run attaches nothing. If attaching fails part way, the fragments
    /// already attached are retracted and the run fails.
    pub async fn run_into<S>(
        &self,
        request: GenerationRequest,
        sink: &mut S,
    ) -> Result<GenerationOutcome, OrchestratorError>
    where
        S: ContentSink + ?Sized,
    {
        let guard = RunGuard::begin(&self.state)?;
        let span = info_span!("generation", topic = %request.topic, policy = ?self.policy);

        let mut outcome = self.execute(request).instrument(span).await;

        if let Err(e) = attach_all(sink, &outcome) {
            outcome.status = OutcomeStatus::Failed {
                message: format!("Error displaying content: {}", e),
            };
            if self.policy == JoinPolicy::FailFast {
                outcome.clear_texts();
            }
        }

        let terminal = if outcome.is_complete() {
            OrchestratorState::Complete
        } else {
            OrchestratorState::Failed
        };
        guard.finish(terminal);

        Ok(outcome)
    }

    async fn execute(&self, request: GenerationRequest) -> GenerationOutcome {
        let start = Instant::now();

        if let Err(e) = request.validate() {
            warn!(error = %e, "invalid request");
            return GenerationOutcome::failed(None, &GenerationError::from(e), start.elapsed());
        }
        if !self.source.is_ready() {
            let e = GenerationError::Gateway(GatewayError::Configuration(
                "API key is not configured".to_string(),
            ));
            warn!("content source not configured");
            return GenerationOutcome::failed(None, &e, start.elapsed());
        }

        info!("generation started");
        let request = Arc::new(request);
        let [lesson, activities, quiz] = ContentKind::PRIMARY.map(|kind| self.spawn(kind, &request));

        let outcome = match self.policy {
            JoinPolicy::FailFast => {
                let joined = tokio::try_join!(
                    settle(ContentKind::Lesson, lesson),
                    settle(ContentKind::Activities, activities),
                    settle(ContentKind::Quiz, quiz),
                );
                match joined {
                    Ok((lesson, activities, quiz)) => {
                        GenerationOutcome::complete(lesson, activities, quiz, start.elapsed())
                    }
                    Err((kind, e)) => GenerationOutcome::failed(Some(kind), &e, start.elapsed()),
                }
            }
            JoinPolicy::AllSettled => {
                let results = tokio::join!(
                    settle(ContentKind::Lesson, lesson),
                    settle(ContentKind::Activities, activities),
                    settle(ContentKind::Quiz, quiz),
                );
                all_settled([results.0, results.1, results.2], start)
            }
        };

        match &outcome.status {
            OutcomeStatus::Complete => {
                info!(elapsed_ms = outcome.elapsed.as_millis() as u64, "generation complete")
            }
            OutcomeStatus::Failed { message } => warn!(
                failed_kind = ?outcome.failed_kind,
                %message,
                "generation failed"
            ),
        }
        outcome
    }

    fn spawn(
        &self,
        kind: ContentKind,
        request: &Arc<GenerationRequest>,
    ) -> JoinHandle<Result<String, GenerationError>> {
        let source = Arc::clone(&self.source);
        let request = Arc::clone(request);
        tokio::spawn(
            async move { source.generate(kind, &request).await }
                .instrument(info_span!("generate", %kind)),
        )
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("policy", &self.policy)
            .field("state", &self.state())
            .finish()
    }
}

/// Attach every text in `outcome`, or none of them.
fn attach_all<S>(sink: &mut S, outcome: &GenerationOutcome) -> std::io::Result<()>
where
    S: ContentSink + ?Sized,
{
    let mut attached = Vec::new();
    for kind in ContentKind::PRIMARY {
        let Some(text) = outcome.get(kind) else {
            continue;
        };
        if let Err(e) = sink.attach(kind, text) {
            warn!(%kind, error = %e, "failed to attach fragment");
            for done in attached {
                if let Err(e) = sink.retract(done) {
                    warn!(kind = %done, error = %e, "failed to retract fragment");
                }
            }
            return Err(e);
        }
        attached.push(kind);
    }
    Ok(())
}

/// Await one task, tagging any failure with its kind.
async fn settle(
    kind: ContentKind,
    handle: JoinHandle<Result<String, GenerationError>>,
) -> Result<String, (ContentKind, GenerationError)> {
    match handle.await {
        Ok(result) => result.map_err(|e| (kind, e)),
        Err(e) => Err((kind, GenerationError::Task(e.to_string()))),
    }
}

fn all_settled(
    results: [Result<String, (ContentKind, GenerationError)>; 3],
    start: Instant,
) -> GenerationOutcome {
    let mut texts = Vec::new();
    let mut first_failure = None;

    for (kind, result) in ContentKind::PRIMARY.into_iter().zip(results) {
        match result {
            Ok(text) => texts.push((kind, text)),
            Err(failure) => {
                if first_failure.is_none() {
                    first_failure = Some(failure);
                }
            }
        }
    }

    let mut outcome = match first_failure {
        None => GenerationOutcome {
            lesson: None,
            activities: None,
            quiz: None,
            status: OutcomeStatus::Complete,
            failed_kind: None,
            elapsed: start.elapsed(),
        },
        Some((kind, e)) => GenerationOutcome::failed(Some(kind), &e, start.elapsed()),
    };
    for (kind, text) in texts {
        outcome.set(kind, text);
    }
    outcome
}

fn lock(state: &Mutex<OrchestratorState>) -> MutexGuard<'_, OrchestratorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds the state at `Running` for one run.
///
/// Dropped without [`RunGuard::finish`] (the run future was dropped), the
/// state goes back to `Idle`.
struct RunGuard<'a> {
    state: &'a Mutex<OrchestratorState>,
    finished: bool,
}

impl<'a> RunGuard<'a> {
    fn begin(state: &'a Mutex<OrchestratorState>) -> Result<Self, OrchestratorError> {
        let mut current = lock(state);
        if *current == OrchestratorState::Running {
            return Err(OrchestratorError::AlreadyRunning);
        }
        *current = OrchestratorState::Running;
        Ok(Self {
            state,
            finished: false,
        })
    }

    fn finish(mut self, terminal: OrchestratorState) {
        debug_assert!(terminal.is_terminal());
        *lock(self.state) = terminal;
        self.finished = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *lock(self.state) = OrchestratorState::Idle;
        }
    }
}

/// Sink for runs nobody displays.
struct Discard;

impl ContentSink for Discard {
    fn attach(&mut self, _kind: ContentKind, _html: &str) -> std::io::Result<()> {
        Ok(())
    }

    fn retract(&mut self, _kind: ContentKind) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentGenerator, GeneratorConfig};
    use crate::sink::MemorySink;
    use async_trait::async_trait;
    use ef_core::{AudienceType, ValidationError};
    use ef_gateway::{ChatRequest, DispatchStrategy, ModelGateway};
    use ef_sim::{FaultConfig, SimStrategy};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Per-kind scripted answers with optional latency.
    #[derive(Default)]
    struct Scripted {
        answers: HashMap<ContentKind, (Duration, Result<String, GenerationError>)>,
        calls: AtomicUsize,
        finished: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn answer(mut self, kind: ContentKind, delay_ms: u64, result: Result<&str, GenerationError>) -> Self {
            self.answers.insert(
                kind,
                (Duration::from_millis(delay_ms), result.map(str::to_string)),
            );
            self
        }

        fn photosynthesis() -> Self {
            Self::default()
                .answer(ContentKind::Lesson, 30, Ok("L"))
                .answer(ContentKind::Activities, 10, Ok("A"))
                .answer(ContentKind::Quiz, 20, Ok("Q"))
        }
    }

    #[async_trait]
    impl ContentSource for Scripted {
        async fn generate(
            &self,
            kind: ContentKind,
            _request: &GenerationRequest,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, result) = self
                .answers
                .get(&kind)
                .cloned()
                .unwrap_or((Duration::ZERO, Ok(String::new())));
            tokio::time::sleep(delay).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            result
        }
    }

    struct NotReady;

    #[async_trait]
    impl ContentSource for NotReady {
        async fn generate(
            &self,
            _kind: ContentKind,
            _request: &GenerationRequest,
        ) -> Result<String, GenerationError> {
            panic!("must not be called");
        }

        fn is_ready(&self) -> bool {
            false
        }
    }

    fn rate_limited() -> GenerationError {
        GenerationError::Gateway(GatewayError::Provider {
            status: 429,
            message: "rate limited".to_string(),
        })
    }

    fn photosynthesis() -> GenerationRequest {
        GenerationRequest::new("Photosynthesis")
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_all_success() {
        let orchestrator = Orchestrator::new(Arc::new(Scripted::photosynthesis()));
        let mut sink = MemorySink::new();

        let outcome = orchestrator.run_into(photosynthesis(), &mut sink).await.unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Complete);
        assert_eq!(outcome.lesson.as_deref(), Some("L"));
        assert_eq!(outcome.activities.as_deref(), Some("A"));
        assert_eq!(outcome.quiz.as_deref(), Some("Q"));
        assert_eq!(outcome.failed_kind, None);
        assert_eq!(sink.get(ContentKind::Lesson), Some("L"));
        assert_eq!(sink.get(ContentKind::Activities), Some("A"));
        assert_eq!(sink.get(ContentKind::Quiz), Some("Q"));
        assert_eq!(orchestrator.state(), OrchestratorState::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generations_run_concurrently() {
        let orchestrator = Orchestrator::new(Arc::new(
            Scripted::default()
                .answer(ContentKind::Lesson, 1_000, Ok("L"))
                .answer(ContentKind::Activities, 1_000, Ok("A"))
                .answer(ContentKind::Quiz, 1_000, Ok("Q")),
        ));

        let outcome = orchestrator.run(photosynthesis()).await.unwrap();
        assert!(outcome.is_complete());
        assert!(outcome.elapsed < Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_ignores_late_successes() {
        let source = Arc::new(
            Scripted::default()
                .answer(ContentKind::Lesson, 500, Ok("L"))
                .answer(ContentKind::Activities, 10, Err(rate_limited()))
                .answer(ContentKind::Quiz, 500, Ok("Q")),
        );
        let finished = Arc::clone(&source.finished);
        let orchestrator = Orchestrator::new(source);
        let mut sink = MemorySink::new();

        let outcome = orchestrator.run_into(photosynthesis(), &mut sink).await.unwrap();

        assert_eq!(outcome.failed_kind, Some(ContentKind::Activities));
        assert_eq!(
            outcome.message(),
            Some("Error generating content: Provider error (429): rate limited")
        );
        assert_eq!(outcome.lesson, None);
        assert_eq!(outcome.quiz, None);
        assert!(sink.is_empty());
        assert_eq!(orchestrator.state(), OrchestratorState::Failed);
        assert!(outcome.elapsed < Duration::from_millis(500));

        // The slow tasks were not cancelled.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 3);
        assert!(sink.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_settled_keeps_successes() {
        let orchestrator = Orchestrator::new(Arc::new(
            Scripted::default()
                .answer(ContentKind::Lesson, 50, Ok("L"))
                .answer(ContentKind::Activities, 10, Ok("A"))
                .answer(ContentKind::Quiz, 20, Err(rate_limited())),
        ))
        .with_policy(JoinPolicy::AllSettled);
        let mut sink = MemorySink::new();

        let outcome = orchestrator.run_into(photosynthesis(), &mut sink).await.unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.failed_kind, Some(ContentKind::Quiz));
        assert_eq!(outcome.lesson.as_deref(), Some("L"));
        assert_eq!(outcome.activities.as_deref(), Some("A"));
        assert_eq!(outcome.quiz, None);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.get(ContentKind::Quiz), None);
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_calls() {
        let source = Arc::new(Scripted::photosynthesis());
        let orchestrator = Orchestrator::new(source.clone());

        let outcome = orchestrator.run(GenerationRequest::new("   ")).await.unwrap();

        assert_eq!(
            outcome.message(),
            Some(format!("Error generating content: {}", ValidationError::EmptyTopic).as_str())
        );
        assert_eq!(outcome.failed_kind, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(orchestrator.state(), OrchestratorState::Failed);
    }

    #[tokio::test]
    async fn test_unconfigured_source_fails_without_calls() {
        let orchestrator = Orchestrator::new(Arc::new(NotReady));
        let outcome = orchestrator.run(photosynthesis()).await.unwrap();
        assert!(outcome.message().unwrap().contains("Configuration error"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_while_running_rejected() {
        let orchestrator = Arc::new(Orchestrator::new(Arc::new(
            Scripted::default()
                .answer(ContentKind::Lesson, 1_000, Ok("L"))
                .answer(ContentKind::Activities, 1_000, Ok("A"))
                .answer(ContentKind::Quiz, 1_000, Ok("Q")),
        )));

        let first = tokio::spawn({
            let orchestrator = Arc::clone(&orchestrator);
            async move { orchestrator.run(photosynthesis()).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(orchestrator.state(), OrchestratorState::Running);

        let second = orchestrator.run(photosynthesis()).await;
        assert_eq!(second, Err(OrchestratorError::AlreadyRunning));

        let first = first.await.unwrap().unwrap();
        assert!(first.is_complete());

        // Terminal state allows a new run.
        assert!(orchestrator.run(photosynthesis()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_run_returns_to_idle() {
        let orchestrator = Orchestrator::new(Arc::new(
            Scripted::default().answer(ContentKind::Lesson, 10_000, Ok("L")),
        ));

        let result = tokio::time::timeout(
            Duration::from_millis(100),
            orchestrator.run(photosynthesis()),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
    }

    /// Sink whose `fail_on`-th attach fails.
    struct FailingSink {
        inner: MemorySink,
        attach_count: usize,
        fail_on: usize,
    }

    impl FailingSink {
        fn new(fail_on: usize) -> Self {
            Self {
                inner: MemorySink::new(),
                attach_count: 0,
                fail_on,
            }
        }
    }

    impl ContentSink for FailingSink {
        fn attach(&mut self, kind: ContentKind, html: &str) -> std::io::Result<()> {
            self.attach_count += 1;
            if self.attach_count == self.fail_on {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            self.inner.attach(kind, html)
        }

        fn retract(&mut self, kind: ContentKind) -> std::io::Result<()> {
            self.inner.retract(kind)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_failure_leaves_no_partial_output() {
        let orchestrator = Orchestrator::new(Arc::new(Scripted::photosynthesis()));
        let mut sink = FailingSink::new(2);

        let outcome = orchestrator.run_into(photosynthesis(), &mut sink).await.unwrap();

        assert_eq!(
            outcome.status,
            OutcomeStatus::Failed {
                message: "Error displaying content: disk full".to_string()
            }
        );
        assert_eq!(outcome.lesson, None);
        assert_eq!(outcome.activities, None);
        assert_eq!(outcome.quiz, None);
        assert!(sink.inner.is_empty());
        assert_eq!(orchestrator.state(), OrchestratorState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_failure_all_settled_keeps_texts() {
        let orchestrator = Orchestrator::new(Arc::new(Scripted::photosynthesis()))
            .with_policy(JoinPolicy::AllSettled);
        let mut sink = FailingSink::new(3);

        let outcome = orchestrator.run_into(photosynthesis(), &mut sink).await.unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.lesson.as_deref(), Some("L"));
        assert_eq!(outcome.quiz.as_deref(), Some("Q"));
        assert!(sink.inner.is_empty());
    }

    /// Answers each primary kind with fixed HTML, picked by temperature.
    struct ByTemperature;

    impl ByTemperature {
        fn html(kind: ContentKind) -> &'static str {
            match kind {
                ContentKind::Lesson => "<h1>Photosynthesis lesson</h1>",
                ContentKind::Activities => "<ol><li>Leaf chromatography</li></ol>",
                ContentKind::Quiz => "<ol><li>What gas do plants release?</li></ol>",
                ContentKind::SubPack => "<h1>Sub pack</h1>",
            }
        }
    }

    #[async_trait]
    impl DispatchStrategy for ByTemperature {
        async fn dispatch(&self, request: &ChatRequest) -> Result<String, GatewayError> {
            ContentKind::PRIMARY
                .into_iter()
                .find(|kind| kind.temperature() == request.temperature())
                .map(|kind| Self::html(kind).to_string())
                .ok_or_else(|| GatewayError::InvalidRequest("unexpected temperature".to_string()))
        }

        fn name(&self) -> &'static str {
            "by-temperature"
        }
    }

    /// Rejects every call as rate limited.
    struct RateLimited;

    #[async_trait]
    impl DispatchStrategy for RateLimited {
        async fn dispatch(&self, _request: &ChatRequest) -> Result<String, GatewayError> {
            Err(GatewayError::Provider {
                status: 429,
                message: "rate limited".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "rate-limited"
        }
    }

    fn photosynthesis_form() -> GenerationRequest {
        GenerationRequest::new("Photosynthesis")
            .with_audience(AudienceType::Teacher)
            .with_grade_level("5th grade")
            .with_duration_minutes(45)
            .with_standards("NGSS")
            .with_constraints("")
    }

    fn orchestrator_over(strategy: Arc<dyn DispatchStrategy>) -> Orchestrator {
        let gateway = ModelGateway::with_strategy(strategy, Duration::from_secs(60));
        Orchestrator::new(Arc::new(ContentGenerator::new(
            gateway,
            GeneratorConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_photosynthesis_end_to_end_complete() {
        let orchestrator = orchestrator_over(Arc::new(ByTemperature));
        let mut sink = MemorySink::new();

        let outcome = orchestrator
            .run_into(photosynthesis_form(), &mut sink)
            .await
            .unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Complete);
        for kind in ContentKind::PRIMARY {
            assert_eq!(outcome.get(kind), Some(ByTemperature::html(kind)));
            assert_eq!(sink.get(kind), Some(ByTemperature::html(kind)));
        }
    }

    #[tokio::test]
    async fn test_photosynthesis_end_to_end_rate_limited() {
        let orchestrator = orchestrator_over(Arc::new(RateLimited));
        let mut sink = MemorySink::new();

        let outcome = orchestrator
            .run_into(photosynthesis_form(), &mut sink)
            .await
            .unwrap();

        assert!(!outcome.is_complete());
        let message = outcome.message().unwrap();
        assert!(message.starts_with("Error generating content: "));
        assert!(message.contains("rate limited"));
        assert!(outcome.failed_kind.is_some());
        assert!(sink.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_simulation_complete_iff_no_fault() {
        let base_seed = ef_sim::get_or_generate_seed();
        let request = photosynthesis_form();

        for iteration in 0..40u64 {
            let seed = ef_sim::derive_seed(base_seed, &iteration.to_le_bytes());
            let context = format!("EF_SIM_SEED={} iteration {}", base_seed, iteration);
            let sim = Arc::new(SimStrategy::new(seed, FaultConfig::aggressive()));

            let faulted: Vec<ContentKind> = ContentKind::PRIMARY
                .into_iter()
                .filter(|kind| {
                    let prompts = ef_core::PromptBuilder::build(&request, *kind).unwrap();
                    let chat = ChatRequest::new(
                        prompts.to_messages(),
                        ef_core::DEFAULT_MODEL,
                        kind.temperature(),
                    )
                    .unwrap();
                    sim.decide(&chat).fault.is_some()
                })
                .collect();

            let outcome = orchestrator_over(sim.clone())
                .run(request.clone())
                .await
                .unwrap();

            assert_eq!(
                outcome.is_complete(),
                faulted.is_empty(),
                "{} ({}): faulted={:?} outcome={:?}",
                context,
                sim.format_seed(),
                faulted,
                outcome.status
            );
            if let Some(kind) = outcome.failed_kind {
                assert!(faulted.contains(&kind), "{}", context);
            }

            let again = orchestrator_over(Arc::new(SimStrategy::new(seed, FaultConfig::aggressive())))
                .run(request.clone())
                .await
                .unwrap();
            assert_eq!(again.status, outcome.status, "{}", context);
        }
    }
}
