//! Templated contextual responses keyed by attachment style.

use serde::Serialize;

use super::strategy::InteractionStrategy;
use crate::models::AttachmentStyle;

/// Characters of context echoed back before truncation.
pub const CONTEXT_EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextualResponse {
    pub response: &'static str,
    pub strategy_used: InteractionStrategy,
    pub context: String,
    pub psychological_rationale: String,
}

/// First [`CONTEXT_EXCERPT_CHARS`] characters of `context`, with `...`
/// appended when anything was cut.
pub fn context_excerpt(context: &str) -> String {
    if context.chars().count() > CONTEXT_EXCERPT_CHARS {
        let head: String = context.chars().take(CONTEXT_EXCERPT_CHARS).collect();
        format!("{head}...")
    } else {
        context.to_string()
    }
}

pub fn contextual_response(style: AttachmentStyle, context: &str) -> ContextualResponse {
    let (response, strategy_used) = match style {
        AttachmentStyle::Secure => (
            "I appreciate you sharing that with me. How can we work together on this?",
            InteractionStrategy::SupportiveListening,
        ),
        AttachmentStyle::Anxious => (
            "Thank you for telling me this. I want to make sure I understand how you're feeling.",
            InteractionStrategy::EmotionalValidation,
        ),
        AttachmentStyle::Avoidant => (
            "I hear what you're saying. Let me think about that for a moment.",
            InteractionStrategy::ThoughtfulPresence,
        ),
        AttachmentStyle::Exploratory | AttachmentStyle::Unknown => (
            "That's really interesting. I'd love to explore this more with you.",
            InteractionStrategy::CuriousExploration,
        ),
    };

    ContextualResponse {
        response,
        strategy_used,
        context: context_excerpt(context),
        psychological_rationale: format!(
            "Response generated based on {style} attachment style and context analysis"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_selects_template() {
        let secure = contextual_response(AttachmentStyle::Secure, "hi");
        assert_eq!(secure.strategy_used, InteractionStrategy::SupportiveListening);
        let avoidant = contextual_response(AttachmentStyle::Avoidant, "hi");
        assert_eq!(avoidant.strategy_used, InteractionStrategy::ThoughtfulPresence);
        let other = contextual_response(AttachmentStyle::Exploratory, "hi");
        assert_eq!(other.strategy_used, InteractionStrategy::CuriousExploration);
        assert_eq!(
            other.psychological_rationale,
            "Response generated based on exploratory attachment style and context analysis"
        );
    }

    #[test]
    fn long_context_is_truncated() {
        let long = "x".repeat(150);
        let excerpt = context_excerpt(&long);
        assert_eq!(excerpt.chars().count(), 103);
        assert!(excerpt.ends_with("..."));

        let exact = "y".repeat(100);
        assert_eq!(context_excerpt(&exact), exact);
    }
}
