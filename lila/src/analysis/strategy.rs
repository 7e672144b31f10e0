//! Interaction strategy selection from attachment style and context.

use serde::Serialize;
use std::fmt;

use crate::models::AttachmentStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStrategy {
    EmotionalBonding,
    VulnerableDisclosure,
    SupportiveListening,
    TrustBuilding,
    ReassuranceSeeking,
    EmotionalValidation,
    SecureBonding,
    SafetyCreation,
    AutonomousConnection,
    ThoughtfulPresence,
    RespectfulDistance,
    GradualOpening,
    GrowthOrientedSupport,
    PlayfulEngagement,
    CuriousExploration,
    AuthenticExpression,
}

impl InteractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmotionalBonding => "emotional_bonding",
            Self::VulnerableDisclosure => "vulnerable_disclosure",
            Self::SupportiveListening => "supportive_listening",
            Self::TrustBuilding => "trust_building",
            Self::ReassuranceSeeking => "reassurance_seeking",
            Self::EmotionalValidation => "emotional_validation",
            Self::SecureBonding => "secure_bonding",
            Self::SafetyCreation => "safety_creation",
            Self::AutonomousConnection => "autonomous_connection",
            Self::ThoughtfulPresence => "thoughtful_presence",
            Self::RespectfulDistance => "respectful_distance",
            Self::GradualOpening => "gradual_opening",
            Self::GrowthOrientedSupport => "growth_oriented_support",
            Self::PlayfulEngagement => "playful_engagement",
            Self::CuriousExploration => "curious_exploration",
            Self::AuthenticExpression => "authentic_expression",
        }
    }
}

impl fmt::Display for InteractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use InteractionStrategy::*;

const SECURE: [InteractionStrategy; 4] = [
    EmotionalBonding,
    VulnerableDisclosure,
    SupportiveListening,
    TrustBuilding,
];
const ANXIOUS: [InteractionStrategy; 4] = [
    ReassuranceSeeking,
    EmotionalValidation,
    SecureBonding,
    SafetyCreation,
];
const AVOIDANT: [InteractionStrategy; 4] = [
    AutonomousConnection,
    ThoughtfulPresence,
    RespectfulDistance,
    GradualOpening,
];
const EXPLORATORY: [InteractionStrategy; 4] = [
    GrowthOrientedSupport,
    PlayfulEngagement,
    CuriousExploration,
    AuthenticExpression,
];

/// Ordered candidates for a style. Unknown styles share the secure list.
pub fn candidate_strategies(style: AttachmentStyle) -> &'static [InteractionStrategy; 4] {
    match style {
        AttachmentStyle::Anxious => &ANXIOUS,
        AttachmentStyle::Avoidant => &AVOIDANT,
        AttachmentStyle::Exploratory => &EXPLORATORY,
        AttachmentStyle::Secure | AttachmentStyle::Unknown => &SECURE,
    }
}

/// Pick a strategy. Rules are checked in order and the first match wins;
/// matching is a case-insensitive substring search.
pub fn select_strategy(
    style: AttachmentStyle,
    conversation_context: &str,
    active_goals: &str,
) -> InteractionStrategy {
    let context = conversation_context.to_lowercase();
    let goals = active_goals.to_lowercase();

    if context.contains("first") || context.contains("new") {
        return match style {
            AttachmentStyle::Anxious => ReassuranceSeeking,
            AttachmentStyle::Avoidant => ThoughtfulPresence,
            _ => EmotionalBonding,
        };
    }
    if context.contains("deep") || context.contains("intimate") {
        return match style {
            AttachmentStyle::Avoidant => GradualOpening,
            _ => VulnerableDisclosure,
        };
    }
    if goals.contains("trust") {
        return TrustBuilding;
    }
    if goals.contains("vulnerability") {
        return VulnerableDisclosure;
    }
    candidate_strategies(style)[0]
}
