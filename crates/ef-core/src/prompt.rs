//! Prompt generation from generation requests.
//!
//! Each content kind has a fixed system prompt and a user prompt that
//! interpolates the request. The user prompt always carries the topic, grade
//! level and duration verbatim so the model cannot drift off the brief.

use crate::kind::ContentKind;
use crate::message::ChatMessage;
use crate::request::{GenerationRequest, ValidationError};

/// System and user prompt for one content kind.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    system_prompt: String,
    user_prompt: String,
}

impl PromptPair {
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    /// Ordered message list: system first, then user.
    #[must_use]
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(self.user_prompt.clone()),
        ]
    }
}

/// Prompt builder - one template pair per content kind.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the prompt pair for `kind`.
    ///
    /// Fails only when the request itself is invalid.
    pub fn build(request: &GenerationRequest, kind: ContentKind) -> Result<PromptPair, ValidationError> {
        request.validate()?;

        let user_prompt = match kind {
            ContentKind::Lesson => Self::lesson_prompt(request),
            ContentKind::Activities => Self::activities_prompt(request),
            ContentKind::Quiz => Self::quiz_prompt(request),
            ContentKind::SubPack => Self::sub_pack_prompt(request),
        };

        Ok(PromptPair {
            system_prompt: Self::system_prompt(kind).to_string(),
            user_prompt,
        })
    }

    /// Fixed system prompt for a content kind.
    pub fn system_prompt(kind: ContentKind) -> &'static str {
        match kind {
            ContentKind::Lesson => {
                "You are an expert educational content creator. Generate a detailed, \
standards-aligned lesson plan in HTML format. Include specific learning objectives, \
standards alignment, essential questions, lesson structure with time allocations, \
differentiation strategies, and materials needed. Make it practical and immediately usable."
            }
            ContentKind::Activities => {
                "You are an expert educational content creator. Generate engaging, \
age-appropriate activities for students. Include interactive activities, worksheets, \
and hands-on exercises. Make them practical and easy to implement."
            }
            ContentKind::Quiz => {
                "You are an expert assessment creator. Generate a comprehensive quiz with \
various question types including multiple choice, true/false, short answer, fill in the \
blank, and critical thinking questions. Always include an answer key, and rubrics where \
appropriate."
            }
            ContentKind::SubPack => {
                "You are creating materials for a substitute teacher who has no prior \
knowledge of the class or topic. Create extremely detailed, step-by-step instructions \
that require zero preparation. Include exact scripts, timing, and contingency plans."
            }
        }
    }

    fn lesson_prompt(request: &GenerationRequest) -> String {
        let mut prompt = format!(
            r#"Create a {duration}-minute lesson plan for {grade} students on the topic: "{topic}".
Educator type: {audience}"#,
            duration = request.duration_minutes,
            grade = request.grade_level,
            topic = request.topic,
            audience = request.audience_type,
        );

        if let Some(standards) = request.effective_standards() {
            prompt.push_str(&format!("\nStandards framework: {}", standards));
        }
        if let Some(constraints) = request.effective_constraints() {
            prompt.push_str(&format!("\nAdditional constraints: {}", constraints));
        }

        prompt.push_str(
            "\n\nFormat the response as HTML with appropriate sections and styling classes \
that match the existing UI.",
        );
        prompt
    }

    fn activities_prompt(request: &GenerationRequest) -> String {
        let mut prompt = format!(
            r#"Create 4-5 engaging activities for {grade} students learning about "{topic}".
Duration available: {duration} minutes
Educator type: {audience}"#,
            grade = request.grade_level,
            topic = request.topic,
            duration = request.duration_minutes,
            audience = request.audience_type,
        );

        if !request.selected_option_tags.is_empty() {
            let options = request
                .selected_option_tags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            prompt.push_str(&format!("\nSpecial requirements: {}", options));
        }

        prompt.push_str(
            "\n\nInclude a mix of individual, pair, and group activities. Format as HTML with \
clear instructions, time allocations, and materials needed.",
        );
        prompt
    }

    fn quiz_prompt(request: &GenerationRequest) -> String {
        format!(
            r#"Create a 5-question assessment quiz for {grade} students on the topic: "{topic}".
Time available: {duration} minutes

Include exactly:
1. One multiple choice question with 4 options
2. One true/false question
3. One short answer question
4. One fill in the blank question
5. One critical thinking/essay question

Provide an answer key with sample answers. Format as HTML with appropriate styling."#,
            grade = request.grade_level,
            topic = request.topic,
            duration = request.duration_minutes,
        )
    }

    fn sub_pack_prompt(request: &GenerationRequest) -> String {
        let mut prompt = format!(
            r#"Create a complete substitute teacher pack for a {duration}-minute lesson on "{topic}" for {grade} students."#,
            duration = request.duration_minutes,
            topic = request.topic,
            grade = request.grade_level,
        );

        if let Some(constraints) = request.effective_constraints() {
            prompt.push_str(&format!("\nAdditional constraints: {}", constraints));
        }

        prompt.push_str(
            r#"

Include:
- Quick start instructions
- Detailed minute-by-minute schedule
- Exact teacher script (what to say)
- Behavior management tips
- 3 backup activities if time remains
- Emergency procedures

Make it so clear that anyone could teach this lesson successfully with no preparation. Format as HTML."#,
        );
        prompt
    }
}
