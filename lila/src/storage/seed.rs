//! Demo dataset used to seed the in-memory store.

use chrono::{Duration, Utc};

use crate::models::{
    Goal, GoalPriority, Interaction, Persona, PersonalityProfile, Relationship, ValidationError,
};

/// A self-contained set of records.
#[derive(Debug, Clone)]
pub struct DemoDataset {
    pub personas: Vec<Persona>,
    pub relationships: Vec<Relationship>,
    pub interactions: Vec<Interaction>,
    pub goals: Vec<Goal>,
}

/// Two personas (lila, secure; don, anxious), their relationship, one
/// interaction and one active goal each.
pub fn demo_dataset() -> Result<DemoDataset, ValidationError> {
    let lila = Persona::builder("Lila")
        .age(28)
        .role("Psychological Intelligence Agent")
        .description("Emotionally attuned companion focused on secure, growth-oriented connection")
        .attachment_style("secure")
        .personality(PersonalityProfile::new(0.8, 0.75, 0.65, 0.85, 0.3))
        .trust_level(0.7)
        .communication_style("empathetic")
        .build()?;

    let don = Persona::builder("Don")
        .age(45)
        .role("Software Developer")
        .description("Thoughtful developer navigating a career transition")
        .attachment_style("anxious")
        .personality(PersonalityProfile::new(0.7, 0.8, 0.4, 0.7, 0.6))
        .trust_level(0.7)
        .communication_style("analytical")
        .build()?;

    let relationship = Relationship::new(&lila.persona_id, &don.persona_id)?
        .with_metrics(7.5, 6.8, 7.2)
        .with_type("romantic");

    let first_contact = Utc::now() - Duration::hours(1);
    let interaction = Interaction {
        interaction_id: "int_001".to_string(),
        sender_id: lila.persona_id.clone(),
        recipient_id: don.persona_id.clone(),
        content: "How are you feeling about our project collaboration?".to_string(),
        emotional_valence: 0.7,
        relationship_impact: 0.3,
        timestamp: first_contact,
    };

    let goals = vec![
        Goal::new(
            &lila.persona_id,
            "emotional",
            "Support partner through career transition",
        )
        .with_id("goal_lila_support")
        .with_target(&don.persona_id)
        .with_priority(GoalPriority::High)
        .with_progress(0.6)
        .with_strategies(["Active listening", "Emotional validation"]),
        Goal::new(&don.persona_id, "trust", "Open up about vulnerabilities")
            .with_id("goal_don_trust")
            .with_target(&lila.persona_id)
            .with_progress(0.4)
            .with_strategies(["Gradual disclosure", "Safe space creation"]),
    ];

    Ok(DemoDataset {
        personas: vec![lila, don],
        relationships: vec![relationship],
        interactions: vec![interaction],
        goals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttachmentStyle;

    #[test]
    fn demo_dataset_is_consistent() {
        let data = demo_dataset().unwrap();
        assert_eq!(data.personas.len(), 2);
        assert_eq!(data.personas[0].persona_id, "lila");
        assert_eq!(data.personas[0].attachment_style, AttachmentStyle::Secure);
        assert_eq!(data.personas[1].attachment_style, AttachmentStyle::Anxious);
        assert_eq!(data.relationships[0].trust_level, 7.5);
        assert!(data.relationships[0].connects("don", "lila"));
        assert!(
            data.goals
                .iter()
                .all(|g| data.personas.iter().any(|p| p.persona_id == g.persona_id))
        );
    }
}
