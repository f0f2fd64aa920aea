//! JSON export of a complete run.

use std::path::Path;

use chrono::{DateTime, Utc};
use ef_core::{AudienceType, GenerationRequest};
use serde::{Deserialize, Serialize};

use crate::outcome::GenerationOutcome;

/// Everything needed to reopen a generated lesson package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub topic: String,
    pub audience_type: AudienceType,
    pub grade_level: String,
    pub duration_minutes: u32,
    pub generated_at: DateTime<Utc>,
    pub lesson: String,
    pub activities: String,
    pub quiz: String,
}

impl ExportDocument {
    /// Build from a complete outcome, stamped with the current time.
    pub fn from_outcome(
        request: &GenerationRequest,
        outcome: &GenerationOutcome,
    ) -> Result<Self, ExportError> {
        Self::from_outcome_at(request, outcome, Utc::now())
    }

    pub fn from_outcome_at(
        request: &GenerationRequest,
        outcome: &GenerationOutcome,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, ExportError> {
        if !outcome.is_complete() {
            return Err(ExportError::Incomplete);
        }
        let (Some(lesson), Some(activities), Some(quiz)) = (
            outcome.lesson.clone(),
            outcome.activities.clone(),
            outcome.quiz.clone(),
        ) else {
            return Err(ExportError::Incomplete);
        };

        Ok(Self {
            topic: request.topic.clone(),
            audience_type: request.audience_type,
            grade_level: request.grade_level.clone(),
            duration_minutes: request.duration_minutes,
            generated_at,
            lesson,
            activities,
            quiz,
        })
    }

    /// Suggested file name for this document.
    #[must_use]
    pub fn file_name(&self) -> String {
        export_file_name(&self.topic)
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// `eduforge-<topic>.json`, topic lowercased with whitespace runs as `-`.
#[must_use]
pub fn export_file_name(topic: &str) -> String {
    let slug = topic
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    format!("eduforge-{}.json", slug)
}

/// Export errors.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Only complete generations can be exported")]
    Incomplete,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
