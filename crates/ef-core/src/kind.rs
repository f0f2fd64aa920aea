//! Content kinds and their sampling profiles.

use serde::{Deserialize, Serialize};

/// The kinds of material the generators produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Lesson plan with objectives, structure and differentiation
    Lesson,
    /// Engaging activities for individual, pair and group work
    Activities,
    /// Five-question quiz with answer key
    Quiz,
    /// Substitute teacher pack requiring zero preparation
    SubPack,
}

impl ContentKind {
    /// The three kinds produced by every orchestrated run.
    pub const PRIMARY: [ContentKind; 3] =
        [ContentKind::Lesson, ContentKind::Activities, ContentKind::Quiz];

    /// Stable lowercase name, used for sink keys and file names.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ContentKind::Lesson => "lesson",
            ContentKind::Activities => "activities",
            ContentKind::Quiz => "quiz",
            ContentKind::SubPack => "subpack",
        }
    }

    /// Sampling temperature for this kind.
    ///
    /// Quiz is the most deterministic, activities the most creative.
    #[must_use]
    pub fn temperature(&self) -> f32 {
        match self {
            ContentKind::Lesson => 0.7,
            ContentKind::Activities => 0.8,
            ContentKind::Quiz => 0.6,
            ContentKind::SubPack => 0.7,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
