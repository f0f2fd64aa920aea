//! # ef-core
//!
//! Request model and prompt building for lesson material generation.
//!
//! A [`GenerationRequest`] carries everything a user typed into the form:
//! topic, audience, grade level, duration, standards framework, free-text
//! constraints and the selected option tags. The [`PromptBuilder`] turns a
//! request plus a [`ContentKind`] into a [`PromptPair`], which becomes the
//! ordered `[system, user]` message list sent to the model.
//!
//! | Kind | Output | Temperature |
//! |------|--------|-------------|
//! | lesson | Standards-aligned lesson plan | 0.7 |
//! | activities | 4-5 classroom activities | 0.8 |
//! | quiz | 5-question quiz with answer key | 0.6 |
//! | subpack | Zero-prep substitute teacher pack | 0.7 |
//!
//! Everything here is pure: no I/O, no clocks, no randomness.

pub mod kind;
pub mod message;
pub mod prompt;
pub mod request;

pub use kind::ContentKind;
pub use message::{ChatMessage, Role};
pub use prompt::{PromptBuilder, PromptPair};
pub use request::{AudienceType, GenerationRequest, ValidationError};

/// Model used by every generator unless overridden.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
