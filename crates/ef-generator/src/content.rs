//! Content generators.
//!
//! Each generator builds the prompt pair for its kind and makes one gateway
//! call with the configured model and the kind's temperature. No generator
//! partially succeeds: it returns the full text or the failure, unchanged.

use std::time::Instant;

use async_trait::async_trait;
use ef_core::{ContentKind, GenerationRequest, PromptBuilder, ValidationError, DEFAULT_MODEL};
use ef_gateway::{GatewayError, ModelGateway};
use tracing::{debug, error};

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Model identifier sent with every call
    pub model: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Read `EDUFORGE_MODEL`, falling back to the default model.
    pub fn from_env() -> Self {
        match std::env::var("EDUFORGE_MODEL") {
            Ok(model) if !model.trim().is_empty() => Self {
                model: model.trim().to_string(),
            },
            _ => Self::default(),
        }
    }
}

/// Anything that can produce one kind of content for a request.
///
/// The orchestrator depends on this rather than on [`ContentGenerator`]
/// directly, so stubs can stand in for the model.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn generate(
        &self,
        kind: ContentKind,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError>;

    /// Whether a call has any chance of succeeding.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Model-backed generator for all four content kinds.
pub struct ContentGenerator {
    gateway: ModelGateway,
    config: GeneratorConfig,
}

impl ContentGenerator {
    pub fn new(gateway: ModelGateway, config: GeneratorConfig) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub async fn lesson_plan(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.generate_kind(ContentKind::Lesson, request).await
    }

    pub async fn activities(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.generate_kind(ContentKind::Activities, request).await
    }

    pub async fn quiz(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.generate_kind(ContentKind::Quiz, request).await
    }

    pub async fn sub_pack(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.generate_kind(ContentKind::SubPack, request).await
    }

    async fn generate_kind(
        &self,
        kind: ContentKind,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let prompts = PromptBuilder::build(request, kind)?;
        let start = Instant::now();

        let result = self
            .gateway
            .call(prompts.to_messages(), &self.config.model, kind.temperature())
            .await;

        match result {
            Ok(text) => {
                debug!(
                    %kind,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "content generated"
                );
                Ok(text)
            }
            Err(e) => {
                error!(%kind, error = %e, "error generating content");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl ContentSource for ContentGenerator {
    async fn generate(
        &self,
        kind: ContentKind,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        self.generate_kind(kind, request).await
    }

    fn is_ready(&self) -> bool {
        self.gateway.is_configured()
    }
}

/// Generation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The generation task died before producing a result
    #[error("Generation task failed: {0}")]
    Task(String),
}
