//! Relationship metric mutation.
//!
//! Pure functions: they take a relationship by value and hand back the
//! updated record. Stores are responsible for persisting the result and for
//! serializing concurrent read-modify-write cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{METRIC_MAX, METRIC_MIN, Relationship, ValidationError};

/// Signed adjustments to the three bounded relationship metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    #[serde(default)]
    pub trust: f64,
    #[serde(default)]
    pub intimacy: f64,
    #[serde(default)]
    pub strength: f64,
}

impl MetricDelta {
    pub fn new(trust: f64, intimacy: f64, strength: f64) -> Self {
        Self {
            trust,
            intimacy,
            strength,
        }
    }

    pub fn trust(trust: f64) -> Self {
        Self {
            trust,
            ..Self::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.trust == 0.0 && self.intimacy == 0.0 && self.strength == 0.0
    }

    /// Reject NaN and infinite deltas.
    pub fn validated(self) -> Result<Self, ValidationError> {
        for (name, value) in [
            ("trust_delta", self.trust),
            ("intimacy_delta", self.intimacy),
            ("strength_delta", self.strength),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::new(format!("{name} must be a finite number")));
            }
        }
        Ok(self)
    }
}

/// `clamp(current + delta, 0, 10)`; a non-finite delta leaves the value
/// untouched.
pub fn bounded_add(current: f64, delta: f64) -> f64 {
    if !delta.is_finite() {
        return current.clamp(METRIC_MIN, METRIC_MAX);
    }
    (current + delta).clamp(METRIC_MIN, METRIC_MAX)
}

/// Apply independent, clamped deltas to trust, intimacy and strength.
pub fn apply_relationship_delta(
    mut relationship: Relationship,
    trust_delta: f64,
    intimacy_delta: f64,
    strength_delta: f64,
) -> Relationship {
    relationship.trust_level = bounded_add(relationship.trust_level, trust_delta);
    relationship.intimacy_level = bounded_add(relationship.intimacy_level, intimacy_delta);
    relationship.relationship_strength =
        bounded_add(relationship.relationship_strength, strength_delta);
    relationship.updated_at = Utc::now();
    relationship
}

/// [`apply_relationship_delta`] taking a [`MetricDelta`].
pub fn apply_delta(relationship: Relationship, delta: MetricDelta) -> Relationship {
    apply_relationship_delta(relationship, delta.trust, delta.intimacy, delta.strength)
}

/// Two-term running average with weight 0.5. Not a mean over history.
pub fn blend_valence(previous: f64, incoming: f64) -> f64 {
    let incoming = if incoming.is_nan() {
        0.0
    } else {
        incoming.clamp(-1.0, 1.0)
    };
    let previous = if previous.is_nan() { 0.0 } else { previous };
    (incoming + previous) / 2.0
}

/// Count an interaction against the relationship and blend its valence.
pub fn record_interaction(relationship: Relationship, emotional_valence: f64) -> Relationship {
    record_interaction_at(relationship, emotional_valence, Utc::now())
}

pub fn record_interaction_at(
    mut relationship: Relationship,
    emotional_valence: f64,
    at: DateTime<Utc>,
) -> Relationship {
    relationship.interaction_count = relationship.interaction_count.saturating_add(1);
    relationship.last_interaction = Some(at);
    relationship.emotional_valence = blend_valence(relationship.emotional_valence, emotional_valence);
    relationship.updated_at = at;
    relationship
}
