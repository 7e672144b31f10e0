//! Interactions exchanged between personas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

use super::{Relationship, ValidationError, clamp_or, normalize_id};

/// An immutable record of one message from `sender_id` to `recipient_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub interaction_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    /// Opaque text; only its length is used downstream.
    pub content: String,
    pub emotional_valence: f64,
    pub relationship_impact: f64,
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    /// Length of the content in characters.
    pub fn content_length(&self) -> usize {
        self.content.chars().count()
    }
}

/// Input for recording an interaction. Stores assign the id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInteraction {
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    #[serde(default)]
    pub emotional_valence: f64,
    #[serde(default)]
    pub relationship_impact: f64,
}

impl NewInteraction {
    pub fn new(
        sender_id: impl Into<String>,
        recipient_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            recipient_id: recipient_id.into(),
            content: content.into(),
            emotional_valence: 0.0,
            relationship_impact: 0.0,
        }
    }

    pub fn with_valence(mut self, valence: f64) -> Self {
        self.emotional_valence = valence;
        self
    }

    pub fn with_impact(mut self, impact: f64) -> Self {
        self.relationship_impact = impact;
        self
    }

    /// Normalize ids and clamp valence into `[-1, 1]`.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        self.sender_id = normalize_id(&self.sender_id, "sender_id")?;
        self.recipient_id = normalize_id(&self.recipient_id, "recipient_id")?;
        if self.sender_id == self.recipient_id {
            return Err(ValidationError::new(
                "sender_id and recipient_id must differ",
            ));
        }
        if self.relationship_impact.is_nan() {
            return Err(ValidationError::new("relationship_impact must be a number"));
        }
        self.emotional_valence = clamp_or(self.emotional_valence, -1.0, 1.0, 0.0);
        Ok(self)
    }

    /// Freeze into an [`Interaction`] stamped at `timestamp`.
    pub fn into_interaction(self, timestamp: DateTime<Utc>) -> Interaction {
        Interaction {
            interaction_id: interaction_id(&self.sender_id, &self.recipient_id, timestamp),
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            content: self.content,
            emotional_valence: self.emotional_valence,
            relationship_impact: self.relationship_impact,
            timestamp,
        }
    }
}

/// `int_{sender}_{recipient}_{epoch_millis}`
pub fn interaction_id(sender_id: &str, recipient_id: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "int_{}_{}_{}",
        sender_id,
        recipient_id,
        timestamp.timestamp_millis()
    )
}

/// Outcome of recording an interaction: the stored record and the
/// relationship as it stands afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedInteraction {
    pub interaction: Interaction,
    pub relationship: Relationship,
}

/// Millisecond clock that never hands out the same instant twice.
///
/// Interaction ids embed the millisecond timestamp, so two interactions
/// recorded within the same millisecond are pushed one millisecond apart.
#[derive(Debug, Default)]
pub struct InteractionClock {
    last_millis: AtomicI64,
}

impl InteractionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_millis();
        let previous = match self.last_millis.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |last| Some(now.max(last + 1)),
        ) {
            Ok(previous) | Err(previous) => previous,
        };
        let millis = now.max(previous + 1);
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_strictly_monotonic() {
        let clock = InteractionClock::new();
        let mut last = clock.tick();
        for _ in 0..1000 {
            let next = clock.tick();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn interaction_id_embeds_participants_and_millis() {
        let ts = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(interaction_id("lila", "don", ts), "int_lila_don_1700000000123");
    }

    #[test]
    fn normalized_clamps_valence_and_lowercases_ids() {
        let new = NewInteraction::new("Lila", " DON ", "hello")
            .with_valence(3.0)
            .normalized()
            .unwrap();
        assert_eq!(new.sender_id, "lila");
        assert_eq!(new.recipient_id, "don");
        assert_eq!(new.emotional_valence, 1.0);
    }

    #[test]
    fn normalized_rejects_missing_sender() {
        assert!(NewInteraction::new("", "don", "hi").normalized().is_err());
        assert!(NewInteraction::new("don", "don", "hi").normalized().is_err());
    }

    #[test]
    fn content_length_counts_characters() {
        let interaction = NewInteraction::new("lila", "don", "héllo")
            .into_interaction(Utc::now());
        assert_eq!(interaction.content_length(), 5);
    }
}
