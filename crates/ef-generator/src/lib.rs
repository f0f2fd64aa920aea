//! # ef-generator
//!
//! Generates a lesson package (lesson plan, activities and quiz) for one
//! request by fanning out three model calls and joining them.
//!
//! ## Pipeline
//!
//! ```text
//! GenerationRequest
//!       │
//!       ▼
//! ┌──────────────┐   ┌───────────────────┐   ┌──────────────┐
//! │ Orchestrator │──►│ ContentGenerator  │──►│ ModelGateway │──► provider / proxy
//! └──────────────┘   │ (prompt + temp)   │   └──────────────┘
//!       │            └───────────────────┘
//!       ▼
//! GenerationOutcome ──► ContentSink ──► ExportDocument
//! ```
//!
//! ## Content kinds
//!
//! | Kind       | Temperature | Produced by |
//! |------------|-------------|-------------|
//! | lesson     | 0.7         | orchestrator |
//! | activities | 0.8         | orchestrator |
//! | quiz       | 0.6         | orchestrator |
//! | subpack    | 0.7         | on demand, after a complete run |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ef_core::GenerationRequest;
//! use ef_gateway::{GatewayConfig, ModelGateway};
//! use ef_generator::{ContentGenerator, GeneratorConfig, MemorySink, Orchestrator};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = ModelGateway::from_config(&GatewayConfig::from_env()?)?;
//! let generator = Arc::new(ContentGenerator::new(gateway, GeneratorConfig::from_env()));
//! let orchestrator = Orchestrator::new(generator);
//!
//! let mut sink = MemorySink::new();
//! let outcome = orchestrator
//!     .run_into(GenerationRequest::new("Photosynthesis"), &mut sink)
//!     .await?;
//! println!("{}", outcome.format_summary());
//! # Ok(())
//! # }
//! ```

pub mod content;
pub mod export;
pub mod orchestrator;
pub mod outcome;
pub mod sink;
pub mod timer;

pub use content::{ContentGenerator, ContentSource, GenerationError, GeneratorConfig};
pub use export::{export_file_name, ExportDocument, ExportError};
pub use orchestrator::{JoinPolicy, Orchestrator, OrchestratorError, OrchestratorState};
pub use outcome::{failure_message, GenerationOutcome, OutcomeStatus};
pub use sink::{ContentSink, DirectorySink, MemorySink};
pub use timer::{format_elapsed, ElapsedTicker};
