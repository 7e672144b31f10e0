//! Psychological analysis over personas: attachment compatibility, strategy
//! selection, goal progress and templated responses. Everything here is pure.

pub mod compatibility;
pub mod goals;
pub mod response;
pub mod strategy;

pub use compatibility::{
    Compatibility, CompatibilityLevel, RECOMMENDATIONS, SyntheticScores, compatibility,
    compatibility_of, synthetic_compatibility_scores,
};
pub use goals::{GoalAssessment, GoalProgressReport, assess_goals, parse_goal_list};
pub use response::{ContextualResponse, context_excerpt, contextual_response};
pub use strategy::{InteractionStrategy, candidate_strategies, select_strategy};
