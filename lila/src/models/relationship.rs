//! Relationship records between two personas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DEFAULT_METRIC, METRIC_MAX, METRIC_MIN, ValidationError, clamp_or, normalize_id};

fn default_metric() -> f64 {
    DEFAULT_METRIC
}

fn default_relationship_type() -> String {
    Relationship::UNKNOWN_TYPE.to_string()
}

/// Symmetric record of psychological metrics between two personas.
///
/// `persona1_id`/`persona2_id` keep the order the relationship was created
/// with, but every lookup treats the pair as unordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub persona1_id: String,
    pub persona2_id: String,
    #[serde(default = "default_metric")]
    pub trust_level: f64,
    #[serde(default = "default_metric")]
    pub intimacy_level: f64,
    #[serde(default = "default_metric")]
    pub relationship_strength: f64,
    #[serde(default)]
    pub interaction_count: u64,
    #[serde(default)]
    pub emotional_valence: f64,
    #[serde(default = "default_relationship_type")]
    pub relationship_type: String,
    #[serde(default)]
    pub last_interaction: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    pub const UNKNOWN_TYPE: &'static str = "unknown";

    /// A default relationship: every metric at 5.0, neutral valence.
    pub fn new(persona1_id: &str, persona2_id: &str) -> Result<Self, ValidationError> {
        let persona1_id = normalize_id(persona1_id, "persona1_id")?;
        let persona2_id = normalize_id(persona2_id, "persona2_id")?;
        if persona1_id == persona2_id {
            return Err(ValidationError::new(format!(
                "a relationship needs two distinct personas, got {persona1_id} twice"
            )));
        }

        let now = Utc::now();
        Ok(Self {
            persona1_id,
            persona2_id,
            trust_level: DEFAULT_METRIC,
            intimacy_level: DEFAULT_METRIC,
            relationship_strength: DEFAULT_METRIC,
            interaction_count: 0,
            emotional_valence: 0.0,
            relationship_type: default_relationship_type(),
            last_interaction: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_metrics(mut self, trust: f64, intimacy: f64, strength: f64) -> Self {
        self.trust_level = trust;
        self.intimacy_level = intimacy;
        self.relationship_strength = strength;
        self.clamped()
    }

    pub fn with_type(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_type = relationship_type.into();
        self
    }

    pub fn with_valence(mut self, valence: f64) -> Self {
        self.emotional_valence = clamp_or(valence, -1.0, 1.0, 0.0);
        self
    }

    /// Whether this relationship connects `a` and `b`, in either order.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.persona1_id == a && self.persona2_id == b)
            || (self.persona1_id == b && self.persona2_id == a)
    }

    pub fn involves(&self, persona_id: &str) -> bool {
        self.persona1_id == persona_id || self.persona2_id == persona_id
    }

    /// The other participant, if `persona_id` takes part in this relationship.
    pub fn counterpart(&self, persona_id: &str) -> Option<&str> {
        if self.persona1_id == persona_id {
            Some(&self.persona2_id)
        } else if self.persona2_id == persona_id {
            Some(&self.persona1_id)
        } else {
            None
        }
    }

    /// Force every bounded field back into its declared range.
    pub fn clamped(mut self) -> Self {
        self.trust_level = clamp_or(self.trust_level, METRIC_MIN, METRIC_MAX, DEFAULT_METRIC);
        self.intimacy_level =
            clamp_or(self.intimacy_level, METRIC_MIN, METRIC_MAX, DEFAULT_METRIC);
        self.relationship_strength = clamp_or(
            self.relationship_strength,
            METRIC_MIN,
            METRIC_MAX,
            DEFAULT_METRIC,
        );
        self.emotional_valence = clamp_or(self.emotional_valence, -1.0, 1.0, 0.0);
        self
    }

    /// Normalize ids and clamp metrics before a write.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        self.persona1_id = normalize_id(&self.persona1_id, "persona1_id")?;
        self.persona2_id = normalize_id(&self.persona2_id, "persona2_id")?;
        if self.persona1_id == self.persona2_id {
            return Err(ValidationError::new(format!(
                "a relationship needs two distinct personas, got {} twice",
                self.persona1_id
            )));
        }
        Ok(self.clamped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_relationship_uses_defaults() {
        let rel = Relationship::new("Lila", "don").unwrap();
        assert_eq!(rel.persona1_id, "lila");
        assert_eq!(rel.trust_level, 5.0);
        assert_eq!(rel.intimacy_level, 5.0);
        assert_eq!(rel.relationship_strength, 5.0);
        assert_eq!(rel.interaction_count, 0);
        assert_eq!(rel.relationship_type, "unknown");
    }

    #[test]
    fn self_relationship_is_rejected() {
        assert!(Relationship::new("lila", "LILA").is_err());
    }

    #[test]
    fn connects_is_order_independent() {
        let rel = Relationship::new("lila", "don").unwrap();
        assert!(rel.connects("lila", "don"));
        assert!(rel.connects("don", "lila"));
        assert!(!rel.connects("lila", "nova"));
        assert_eq!(rel.counterpart("don"), Some("lila"));
    }

    #[test]
    fn with_metrics_clamps() {
        let rel = Relationship::new("lila", "don")
            .unwrap()
            .with_metrics(11.0, -3.0, 7.2);
        assert_eq!(rel.trust_level, 10.0);
        assert_eq!(rel.intimacy_level, 0.0);
        assert_eq!(rel.relationship_strength, 7.2);
    }

    #[test]
    fn absent_fields_read_with_defaults() {
        let rel: Relationship = serde_json::from_value(serde_json::json!({
            "persona1_id": "lila",
            "persona2_id": "don"
        }))
        .unwrap();
        assert_eq!(rel.trust_level, 5.0);
        assert_eq!(rel.emotional_valence, 0.0);
        assert_eq!(rel.relationship_type, "unknown");
    }
}
