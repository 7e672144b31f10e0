//! Entity model for the relationship graph.
//!
//! Personas are the root entities. Relationships, interactions and goals
//! reference personas by their lowercase `persona_id`.
//!
//! Numeric psychological fields are clamped to their declared range whenever
//! a record is constructed or normalized for writing, so stores never persist
//! out-of-range values.

pub mod goal;
pub mod interaction;
pub mod persona;
pub mod relationship;

pub use goal::{Goal, GoalPriority, GoalStatus};
pub use interaction::{Interaction, InteractionClock, NewInteraction, RecordedInteraction};
pub use persona::{AttachmentStyle, Persona, PersonaBuilder, PersonalityProfile};
pub use relationship::Relationship;

/// Lower bound of the relationship metrics (trust, intimacy, strength).
pub const METRIC_MIN: f64 = 0.0;
/// Upper bound of the relationship metrics.
pub const METRIC_MAX: f64 = 10.0;
/// Value given to every metric of a freshly created relationship.
pub const DEFAULT_METRIC: f64 = 5.0;
/// Neutral value for personality scalars and persona trust when unset.
pub const NEUTRAL_TRAIT: f64 = 0.5;

/// Raised when a record is missing a required identifier or carries
/// unusable input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Normalize an identifier into its lookup-key form: trimmed and lowercase.
pub fn normalize_id(raw: &str, field: &str) -> Result<String, ValidationError> {
    let id = raw.trim().to_lowercase();
    if id.is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    Ok(id)
}

/// Clamp a value into `[min, max]`, substituting `fallback` for NaN.
pub(crate) fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Clamp into the unit interval, NaN becomes neutral.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    clamp_or(value, 0.0, 1.0, NEUTRAL_TRAIT)
}

pub(crate) fn neutral_trait() -> f64 {
    NEUTRAL_TRAIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_lowercases_and_trims() {
        assert_eq!(normalize_id("  Lila ", "persona_id").unwrap(), "lila");
    }

    #[test]
    fn normalize_id_rejects_blank_input() {
        let err = normalize_id("   ", "persona_id").unwrap_err();
        assert_eq!(err.to_string(), "persona_id is required");
    }

    #[test]
    fn clamp_or_replaces_nan() {
        assert_eq!(clamp_or(f64::NAN, 0.0, 10.0, 5.0), 5.0);
        assert_eq!(clamp_or(12.0, 0.0, 10.0, 5.0), 10.0);
        assert_eq!(clamp_or(-0.5, 0.0, 1.0, 0.5), 0.0);
    }
}
