//! Response documents for resources and tools.
//!
//! Every document is a typed `Serialize` struct; handlers never assemble
//! JSON by string formatting.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use lila::analysis::{GoalAssessment, InteractionStrategy, SyntheticScores};
use lila::models::{Goal, GoalPriority, Interaction, Persona, PersonalityProfile, Relationship};
use lila::storage::StoreMode;

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Serialize a document, falling back to an error document.
pub fn to_value<T: Serialize>(doc: &T) -> Value {
    serde_json::to_value(doc).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("Could not serialize response: {e}") })
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDocument {
    pub error: String,
}

impl ErrorDocument {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Persona id to display name, for documents that show both
#[derive(Debug, Default)]
pub struct NameIndex(HashMap<String, String>);

impl NameIndex {
    pub fn from_personas(personas: &[Persona]) -> Self {
        Self(
            personas
                .iter()
                .map(|p| (p.persona_id.clone(), p.name.clone()))
                .collect(),
        )
    }

    /// Known name, or the id itself
    pub fn name_of(&self, persona_id: &str) -> String {
        self.0
            .get(persona_id)
            .cloned()
            .unwrap_or_else(|| persona_id.to_string())
    }
}

// Resources

#[derive(Debug, Serialize)]
pub struct PersonaSummary {
    pub id: String,
    pub name: String,
    pub age: Option<u32>,
    pub role: String,
    pub attachment_style: String,
    pub personality: PersonalityProfile,
}

impl From<&Persona> for PersonaSummary {
    fn from(p: &Persona) -> Self {
        Self {
            id: p.persona_id.clone(),
            name: p.name.clone(),
            age: p.age,
            role: p.role.clone(),
            attachment_style: p.attachment_style.to_string(),
            personality: p.personality,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonasDocument {
    pub personas: Vec<PersonaSummary>,
    pub count: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PersonaDetail {
    pub id: String,
    pub name: String,
    pub age: Option<u32>,
    pub role: String,
    pub description: String,
    pub attachment_style: String,
    pub personality: PersonalityProfile,
    pub trust_level: f64,
    pub communication_style: Option<String>,
}

impl From<&Persona> for PersonaDetail {
    fn from(p: &Persona) -> Self {
        Self {
            id: p.persona_id.clone(),
            name: p.name.clone(),
            age: p.age,
            role: p.role.clone(),
            description: p.description.clone(),
            attachment_style: p.attachment_style.to_string(),
            personality: p.personality,
            trust_level: p.trust_level,
            communication_style: p.communication_style.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonaDocument {
    pub persona: PersonaDetail,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RelationshipSummary {
    pub persona1_id: String,
    pub persona1_name: String,
    pub persona2_id: String,
    pub persona2_name: String,
    pub trust_level: f64,
    pub intimacy_level: f64,
    pub relationship_strength: f64,
    pub interaction_count: u64,
    pub relationship_type: String,
    pub emotional_valence: f64,
}

impl RelationshipSummary {
    pub fn new(rel: &Relationship, names: &NameIndex) -> Self {
        Self {
            persona1_id: rel.persona1_id.clone(),
            persona1_name: names.name_of(&rel.persona1_id),
            persona2_id: rel.persona2_id.clone(),
            persona2_name: names.name_of(&rel.persona2_id),
            trust_level: rel.trust_level,
            intimacy_level: rel.intimacy_level,
            relationship_strength: rel.relationship_strength,
            interaction_count: rel.interaction_count,
            relationship_type: rel.relationship_type.clone(),
            emotional_valence: rel.emotional_valence,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RelationshipsDocument {
    pub relationships: Vec<RelationshipSummary>,
    pub count: usize,
    pub average_trust: f64,
    pub average_intimacy: f64,
    pub last_updated: DateTime<Utc>,
}

impl RelationshipsDocument {
    pub fn new(relationships: Vec<RelationshipSummary>) -> Self {
        let count = relationships.len();
        let mean = |f: fn(&RelationshipSummary) -> f64| {
            if count == 0 {
                0.0
            } else {
                round_to(relationships.iter().map(f).sum::<f64>() / count as f64, 2)
            }
        };
        let average_trust = mean(|r| r.trust_level);
        let average_intimacy = mean(|r| r.intimacy_level);

        Self {
            relationships,
            count,
            average_trust,
            average_intimacy,
            last_updated: Utc::now(),
        }
    }
}

/// A relationship as seen from the requested ordering of the pair
#[derive(Debug, Serialize)]
pub struct RelationshipDetail {
    pub persona1_id: String,
    pub persona1_name: String,
    pub persona2_id: String,
    pub persona2_name: String,
    pub trust_level: f64,
    pub intimacy_level: f64,
    pub relationship_strength: f64,
    pub interaction_count: u64,
    pub relationship_type: String,
    pub emotional_valence: f64,
    pub last_interaction: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RelationshipDetail {
    pub fn new(first: &str, second: &str, rel: &Relationship, names: &NameIndex) -> Self {
        Self {
            persona1_id: first.to_string(),
            persona1_name: names.name_of(first),
            persona2_id: second.to_string(),
            persona2_name: names.name_of(second),
            trust_level: rel.trust_level,
            intimacy_level: rel.intimacy_level,
            relationship_strength: rel.relationship_strength,
            interaction_count: rel.interaction_count,
            relationship_type: rel.relationship_type.clone(),
            emotional_valence: rel.emotional_valence,
            last_interaction: rel.last_interaction,
            created_at: rel.created_at,
            updated_at: rel.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RelationshipDocument {
    pub relationship: RelationshipDetail,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InteractionEntry {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    pub emotional_valence: f64,
    pub relationship_impact: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<Interaction> for InteractionEntry {
    fn from(i: Interaction) -> Self {
        Self {
            id: i.interaction_id,
            sender_id: i.sender_id,
            recipient_id: i.recipient_id,
            content: i.content,
            emotional_valence: i.emotional_valence,
            relationship_impact: i.relationship_impact,
            timestamp: i.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InteractionsDocument {
    pub interactions: Vec<InteractionEntry>,
    pub count: usize,
    pub total_available: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ActiveGoal {
    pub goal_id: String,
    pub persona_id: String,
    pub goal_type: String,
    pub description: String,
    pub progress: f64,
    pub priority: GoalPriority,
    pub strategies: Vec<String>,
}

impl From<Goal> for ActiveGoal {
    fn from(g: Goal) -> Self {
        Self {
            goal_id: g.goal_id,
            persona_id: g.persona_id,
            goal_type: g.goal_type,
            description: g.description,
            progress: g.progress,
            priority: g.priority,
            strategies: g.strategies,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActiveGoalsDocument {
    pub active_goals: Vec<ActiveGoal>,
    pub count: usize,
    pub completion_rate: f64,
}

impl ActiveGoalsDocument {
    pub fn new(goals: Vec<Goal>) -> Self {
        let active_goals: Vec<ActiveGoal> = goals.into_iter().map(ActiveGoal::from).collect();
        let count = active_goals.len();
        let completion_rate = if count == 0 {
            0.0
        } else {
            round_to(
                active_goals.iter().map(|g| g.progress).sum::<f64>() / count as f64,
                3,
            )
        };
        Self {
            active_goals,
            count,
            completion_rate,
        }
    }
}

// Tools

#[derive(Debug, Serialize)]
pub struct MetricChanges {
    pub trust_delta: f64,
    pub intimacy_delta: f64,
    pub strength_delta: f64,
}

#[derive(Debug, Serialize)]
pub struct UpdatedRelationship {
    pub participants: [String; 2],
    pub participant_names: [String; 2],
    pub trust_level: f64,
    pub intimacy_level: f64,
    pub relationship_strength: f64,
    pub changes: MetricChanges,
}

#[derive(Debug, Serialize)]
pub struct UpdateMetricsDocument {
    pub success: bool,
    pub updated_relationship: UpdatedRelationship,
}

#[derive(Debug, Serialize)]
pub struct RecordedSummary {
    pub sender_id: String,
    pub recipient_id: String,
    pub content_length: usize,
    pub emotional_valence: f64,
    pub relationship_impact: f64,
}

#[derive(Debug, Serialize)]
pub struct RelationshipAfterInteraction {
    pub interaction_count: u64,
    pub emotional_valence: f64,
}

#[derive(Debug, Serialize)]
pub struct RecordInteractionDocument {
    pub success: bool,
    pub interaction_id: String,
    pub recorded: RecordedSummary,
    pub relationship: RelationshipAfterInteraction,
}

#[derive(Debug, Serialize)]
pub struct PersonaRef {
    pub id: String,
    pub name: String,
    pub attachment_style: String,
}

impl From<&Persona> for PersonaRef {
    fn from(p: &Persona) -> Self {
        Self {
            id: p.persona_id.clone(),
            name: p.name.clone(),
            attachment_style: p.attachment_style.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompatibilityAnalysis {
    pub persona1: PersonaRef,
    pub persona2: PersonaRef,
    pub relationship_type: String,
    pub compatibility_level: String,
    pub analysis: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CompatibilityDocument<T> {
    pub success: bool,
    pub compatibility_analysis: T,
}

pub type CategoricalCompatibilityDocument = CompatibilityDocument<CompatibilityAnalysis>;
pub type ScoredCompatibilityDocument = CompatibilityDocument<SyntheticScores>;

#[derive(Debug, Serialize)]
pub struct StrategySelection {
    pub persona_id: String,
    pub selected_strategy: InteractionStrategy,
    pub attachment_style: String,
    pub context: String,
    pub available_strategies: Vec<InteractionStrategy>,
    pub reasoning: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StrategySelectionDocument {
    pub success: bool,
    pub strategy_selection: StrategySelection,
}

#[derive(Debug, Serialize)]
pub struct GoalProgress {
    pub persona_id: String,
    pub assessed_goals: Vec<GoalAssessment>,
    pub overall_progress: f64,
    pub assessment_timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct GoalProgressDocument {
    pub success: bool,
    pub goal_progress: GoalProgress,
}

#[derive(Debug, Serialize)]
pub struct ContextualResponseBody {
    pub persona_id: String,
    pub persona_name: String,
    pub response: &'static str,
    pub strategy_used: InteractionStrategy,
    pub attachment_style: String,
    pub context: String,
    pub psychological_rationale: String,
}

#[derive(Debug, Serialize)]
pub struct ContextualResponseDocument {
    pub success: bool,
    pub contextual_response: ContextualResponseBody,
}

#[derive(Debug, Serialize)]
pub struct CommittedState {
    pub participants: [String; 2],
    pub trust_level: f64,
    pub intimacy_level: f64,
    pub relationship_strength: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CommitDocument {
    pub success: bool,
    pub committed: CommittedState,
}

#[derive(Debug, Serialize)]
pub struct FinalizedSession {
    pub committed_relationships: usize,
    pub store_mode: StoreMode,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FinalizeDocument {
    pub success: bool,
    pub finalized: FinalizedSession,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_averages_round_to_two_places() {
        let names = NameIndex::default();
        let a = Relationship::new("a", "b").unwrap().with_metrics(7.5, 6.8, 8.2);
        let b = Relationship::new("b", "c").unwrap().with_metrics(2.0, 3.1, 1.0);
        let doc = RelationshipsDocument::new(vec![
            RelationshipSummary::new(&a, &names),
            RelationshipSummary::new(&b, &names),
        ]);
        assert_eq!(doc.count, 2);
        assert_eq!(doc.average_trust, 4.75);
        assert_eq!(doc.average_intimacy, 4.95);
        assert_eq!(doc.relationships[0].persona1_name, "a");
    }

    #[test]
    fn test_empty_goal_list_has_zero_completion() {
        let doc = ActiveGoalsDocument::new(Vec::new());
        assert_eq!(doc.count, 0);
        assert_eq!(doc.completion_rate, 0.0);
    }
}
