//! Generation requests and their validation.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Who the material is for.
///
/// Standards frameworks only make sense for classroom audiences; coaches and
/// therapists never get one in their prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceType {
    /// Classroom teacher (default)
    #[default]
    Teacher,
    /// Sports or skills coach
    Coach,
    /// Speech, occupational or behavioral therapist
    Therapist,
    /// One-on-one or small-group tutor
    Tutor,
}

impl AudienceType {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            AudienceType::Teacher => "teacher",
            AudienceType::Coach => "coach",
            AudienceType::Therapist => "therapist",
            AudienceType::Tutor => "tutor",
        }
    }

    /// Whether a standards framework applies to this audience.
    pub fn uses_standards(&self) -> bool {
        !matches!(self, AudienceType::Coach | AudienceType::Therapist)
    }
}

impl FromStr for AudienceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "teacher" => Ok(AudienceType::Teacher),
            "coach" => Ok(AudienceType::Coach),
            "therapist" => Ok(AudienceType::Therapist),
            "tutor" => Ok(AudienceType::Tutor),
            other => Err(ValidationError::UnknownAudience(other.to_string())),
        }
    }
}

impl std::fmt::Display for AudienceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything the user supplied for one generation cycle.
///
/// Passed by value into the generators; nothing here outlives the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Topic or learning objective (must be non-empty)
    pub topic: String,
    /// Who will deliver the material
    pub audience_type: AudienceType,
    /// Free-text grade level, e.g. "5th grade"
    pub grade_level: String,
    /// Session length in minutes
    pub duration_minutes: u32,
    /// Standards framework, e.g. "NGSS" or "Common Core"
    pub standards_framework: Option<String>,
    /// Additional free-text constraints
    pub constraints: Option<String>,
    /// Option tags toggled on the form, kept sorted for stable prompts
    pub selected_option_tags: BTreeSet<String>,
}

impl GenerationRequest {
    /// Create a request for the given topic with form defaults.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            audience_type: AudienceType::default(),
            grade_level: "5th grade".to_string(),
            duration_minutes: 45,
            standards_framework: None,
            constraints: None,
            selected_option_tags: BTreeSet::new(),
        }
    }

    pub fn with_audience(mut self, audience: AudienceType) -> Self {
        self.audience_type = audience;
        self
    }

    pub fn with_grade_level(mut self, grade_level: impl Into<String>) -> Self {
        self.grade_level = grade_level.into();
        self
    }

    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Set the standards framework. Blank input clears it.
    pub fn with_standards(mut self, framework: impl Into<String>) -> Self {
        self.standards_framework = non_blank(framework.into());
        self
    }

    /// Set free-text constraints. Blank input clears them.
    pub fn with_constraints(mut self, constraints: impl Into<String>) -> Self {
        self.constraints = non_blank(constraints.into());
        self
    }

    /// Add one option tag. Blank tags are ignored.
    pub fn with_option(mut self, tag: impl Into<String>) -> Self {
        if let Some(tag) = non_blank(tag.into()) {
            self.selected_option_tags.insert(tag);
        }
        self
    }

    /// Toggle an option tag on or off, like clicking it on the form.
    pub fn toggle_option(&mut self, tag: &str) {
        if !self.selected_option_tags.remove(tag) {
            if let Some(tag) = non_blank(tag.to_string()) {
                self.selected_option_tags.insert(tag);
            }
        }
    }

    /// Check the request is fit to dispatch.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        if self.duration_minutes == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        Ok(())
    }

    /// Standards framework, or `None` when the audience does not use one.
    pub fn effective_standards(&self) -> Option<&str> {
        if !self.audience_type.uses_standards() {
            return None;
        }
        self.standards_framework
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Constraints, or `None` when blank.
    pub fn effective_constraints(&self) -> Option<&str> {
        self.constraints
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Request validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a topic or learning objective")]
    EmptyTopic,

    #[error("Duration must be at least one minute")]
    ZeroDuration,

    #[error("Unknown audience '{0}'. Valid values: teacher, coach, therapist, tutor")]
    UnknownAudience(String),
}
