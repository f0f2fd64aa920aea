//! Result of one orchestrated generation run.

use std::time::Duration;

use ef_core::ContentKind;

use crate::content::GenerationError;
use crate::timer::format_elapsed;

/// Prefix of every failure message shown to the user.
pub const FAILURE_PREFIX: &str = "Error generating content";

/// Terminal status of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Complete,
    Failed { message: String },
}

/// Texts produced by a run plus how it ended.
///
/// Under fail-fast joining a failed outcome carries no texts. Under
/// all-settled joining it keeps whichever texts succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub lesson: Option<String>,
    pub activities: Option<String>,
    pub quiz: Option<String>,
    pub status: OutcomeStatus,
    /// First kind whose generation failed, if any
    pub failed_kind: Option<ContentKind>,
    pub elapsed: Duration,
}

impl GenerationOutcome {
    pub(crate) fn complete(
        lesson: String,
        activities: String,
        quiz: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            lesson: Some(lesson),
            activities: Some(activities),
            quiz: Some(quiz),
            status: OutcomeStatus::Complete,
            failed_kind: None,
            elapsed,
        }
    }

    pub(crate) fn failed(
        failed_kind: Option<ContentKind>,
        error: &GenerationError,
        elapsed: Duration,
    ) -> Self {
        Self {
            lesson: None,
            activities: None,
            quiz: None,
            status: OutcomeStatus::Failed {
                message: failure_message(error),
            },
            failed_kind,
            elapsed,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == OutcomeStatus::Complete
    }

    /// Failure message, if the run failed.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Complete => None,
            OutcomeStatus::Failed { message } => Some(message),
        }
    }

    /// Text for one of the primary kinds.
    #[must_use]
    pub fn get(&self, kind: ContentKind) -> Option<&str> {
        match kind {
            ContentKind::Lesson => self.lesson.as_deref(),
            ContentKind::Activities => self.activities.as_deref(),
            ContentKind::Quiz => self.quiz.as_deref(),
            ContentKind::SubPack => None,
        }
    }

    pub(crate) fn set(&mut self, kind: ContentKind, text: String) {
        match kind {
            ContentKind::Lesson => self.lesson = Some(text),
            ContentKind::Activities => self.activities = Some(text),
            ContentKind::Quiz => self.quiz = Some(text),
            ContentKind::SubPack => {}
        }
    }

    pub(crate) fn clear_texts(&mut self) {
        self.lesson = None;
        self.activities = None;
        self.quiz = None;
    }

    /// One-screen summary of the run.
    #[must_use]
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Generation Summary ===\n\n");
        match &self.status {
            OutcomeStatus::Complete => summary.push_str("Status: complete\n"),
            OutcomeStatus::Failed { message } => {
                summary.push_str("Status: failed\n");
                summary.push_str(&format!("Message: {}\n", message));
            }
        }
        if let Some(kind) = self.failed_kind {
            summary.push_str(&format!("Failed kind: {}\n", kind));
        }
        summary.push_str(&format!("Elapsed: {}\n\n", format_elapsed(self.elapsed)));

        for kind in ContentKind::PRIMARY {
            let line = match self.get(kind) {
                Some(text) => format!("  {:<10} {} chars\n", kind.name(), text.chars().count()),
                None => format!("  {:<10} -\n", kind.name()),
            };
            summary.push_str(&line);
        }

        summary
    }
}

/// User-facing message for a failed run.
#[must_use]
pub fn failure_message(error: &GenerationError) -> String {
    format!("{}: {}", FAILURE_PREFIX, error)
}
