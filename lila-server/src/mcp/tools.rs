//! Named operations exposed through `tools/call`.
//!
//! Arguments are typed structs with serde defaults. Each tool returns a
//! success document or an [`OperationError`], which the dispatcher turns
//! into an error document.

use chrono::Utc;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use lila::analysis::{
    RECOMMENDATIONS, assess_goals, candidate_strategies, compatibility, contextual_response,
    parse_goal_list, select_strategy, synthetic_compatibility_scores,
};
use lila::models::{AttachmentStyle, NewInteraction, Persona, normalize_id};
use lila::relationships::MetricDelta;
use lila::storage::{
    GoalStore, GraphStore, InteractionStore, PersonaStore, RelationshipStore, StorageError,
    StoreMode,
};

use super::OperationError;
use super::documents::{
    CategoricalCompatibilityDocument, CommitDocument, CommittedState, CompatibilityAnalysis,
    ContextualResponseBody, ContextualResponseDocument, FinalizeDocument, FinalizedSession,
    GoalProgress, GoalProgressDocument, MetricChanges, PersonaRef, RecordInteractionDocument,
    RecordedSummary, RelationshipAfterInteraction, ScoredCompatibilityDocument, StrategySelection,
    StrategySelectionDocument, UpdateMetricsDocument, UpdatedRelationship, round_to, to_value,
};

/// Every tool this server answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    UpdateRelationshipMetrics,
    RecordInteraction,
    AnalyzePersonaCompatibility,
    ScorePersonaCompatibility,
    AutonomousStrategySelection,
    AssessGoalProgress,
    GenerateContextualResponse,
    CommitRelationshipState,
    FinalizeDemoSession,
}

impl Tool {
    pub const ALL: [Tool; 9] = [
        Tool::UpdateRelationshipMetrics,
        Tool::RecordInteraction,
        Tool::AnalyzePersonaCompatibility,
        Tool::ScorePersonaCompatibility,
        Tool::AutonomousStrategySelection,
        Tool::AssessGoalProgress,
        Tool::GenerateContextualResponse,
        Tool::CommitRelationshipState,
        Tool::FinalizeDemoSession,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tool::UpdateRelationshipMetrics => "update_relationship_metrics",
            Tool::RecordInteraction => "record_interaction",
            Tool::AnalyzePersonaCompatibility => "analyze_persona_compatibility",
            Tool::ScorePersonaCompatibility => "score_persona_compatibility",
            Tool::AutonomousStrategySelection => "autonomous_strategy_selection",
            Tool::AssessGoalProgress => "assess_goal_progress",
            Tool::GenerateContextualResponse => "generate_contextual_response",
            Tool::CommitRelationshipState => "commit_relationship_state",
            Tool::FinalizeDemoSession => "finalize_demo_session",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Tool::UpdateRelationshipMetrics => {
                "Apply trust, intimacy and strength deltas to a relationship; results stay within 0-10"
            }
            Tool::RecordInteraction => {
                "Record an interaction between two personas and blend its emotional valence into their relationship"
            }
            Tool::AnalyzePersonaCompatibility => {
                "Assess relationship potential between two personas from their attachment styles"
            }
            Tool::ScorePersonaCompatibility => {
                "Numeric compatibility scores across attachment, personality, goals and communication"
            }
            Tool::AutonomousStrategySelection => {
                "Select an interaction strategy from attachment style, conversation context and goals"
            }
            Tool::AssessGoalProgress => {
                "Assess progress toward relationship goals; defaults to the persona's active goals"
            }
            Tool::GenerateContextualResponse => {
                "Generate a response in the persona's attachment style for a given context"
            }
            Tool::CommitRelationshipState => {
                "Confirm the current state of a relationship and report its metrics"
            }
            Tool::FinalizeDemoSession => "Report how many relationships the session holds",
        }
    }

    fn input_schema(&self) -> Value {
        let pair = |extra: Value| {
            let mut schema = json!({
                "type": "object",
                "properties": {
                    "persona1_id": {"type": "string"},
                    "persona2_id": {"type": "string"}
                },
                "required": ["persona1_id", "persona2_id"]
            });
            if let (Some(props), Value::Object(extra)) =
                (schema["properties"].as_object_mut(), extra)
            {
                props.extend(extra);
            }
            schema
        };

        match self {
            Tool::UpdateRelationshipMetrics => pair(json!({
                "trust_delta": {"type": "number", "default": 0.0},
                "intimacy_delta": {"type": "number", "default": 0.0},
                "strength_delta": {"type": "number", "default": 0.0}
            })),
            Tool::RecordInteraction => json!({
                "type": "object",
                "properties": {
                    "sender_id": {"type": "string"},
                    "recipient_id": {"type": "string"},
                    "content": {"type": "string"},
                    "emotional_valence": {"type": "number", "default": 0.0, "minimum": -1.0, "maximum": 1.0},
                    "relationship_impact": {"type": "number", "default": 0.0}
                },
                "required": ["sender_id", "recipient_id", "content"]
            }),
            Tool::AnalyzePersonaCompatibility => pair(json!({
                "relationship_type": {"type": "string", "default": "romantic"}
            })),
            Tool::ScorePersonaCompatibility | Tool::CommitRelationshipState => pair(json!({})),
            Tool::AutonomousStrategySelection => json!({
                "type": "object",
                "properties": {
                    "persona_id": {"type": "string"},
                    "conversation_context": {"type": "string", "default": ""},
                    "situation_assessment": {"type": "string", "default": ""},
                    "active_goals": {"type": "string", "default": ""},
                    "attachment_style": {"type": ["string", "null"], "default": null}
                },
                "required": ["persona_id"]
            }),
            Tool::AssessGoalProgress => json!({
                "type": "object",
                "properties": {
                    "persona_id": {"type": "string"},
                    "goals": {"type": "string", "default": "", "description": "Comma-separated goals"},
                    "recent_interactions": {"type": "string", "default": ""}
                },
                "required": ["persona_id"]
            }),
            Tool::GenerateContextualResponse => json!({
                "type": "object",
                "properties": {
                    "persona_id": {"type": "string"},
                    "context": {"type": "string"},
                    "goals": {"type": "string", "default": ""},
                    "constraints": {"type": "string", "default": ""}
                },
                "required": ["persona_id", "context"]
            }),
            Tool::FinalizeDemoSession => json!({"type": "object", "properties": {}}),
        }
    }
}

pub fn list_result() -> Value {
    let tools: Vec<Value> = Tool::ALL
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name(),
                "description": tool.description(),
                "inputSchema": tool.input_schema(),
            })
        })
        .collect();
    json!({ "tools": tools })
}

/// Wrap a tool document as a `tools/call` result.
pub fn call_result(document: &Value, is_error: bool) -> Value {
    json!({
        "content": [{"type": "text", "text": document.to_string()}],
        "structuredContent": document,
        "isError": is_error,
    })
}

/// Decode tool arguments; a missing object counts as empty.
pub fn parse_args<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(arguments.unwrap_or_else(|| json!({})))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMetricsArgs {
    pub persona1_id: String,
    pub persona2_id: String,
    #[serde(default)]
    pub trust_delta: f64,
    #[serde(default)]
    pub intimacy_delta: f64,
    #[serde(default)]
    pub strength_delta: f64,
}

#[derive(Debug, Deserialize)]
pub struct RecordInteractionArgs {
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    #[serde(default)]
    pub emotional_valence: f64,
    #[serde(default)]
    pub relationship_impact: f64,
}

fn default_relationship_type() -> String {
    "romantic".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CompatibilityArgs {
    pub persona1_id: String,
    pub persona2_id: String,
    #[serde(default = "default_relationship_type")]
    pub relationship_type: String,
}

#[derive(Debug, Deserialize)]
pub struct PairArgs {
    pub persona1_id: String,
    pub persona2_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StrategyArgs {
    pub persona_id: String,
    #[serde(default)]
    pub conversation_context: String,
    #[serde(default)]
    pub situation_assessment: String,
    #[serde(default)]
    pub active_goals: String,
    #[serde(default)]
    pub attachment_style: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoalProgressArgs {
    pub persona_id: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub recent_interactions: String,
}

#[derive(Debug, Deserialize)]
pub struct ContextualResponseArgs {
    pub persona_id: String,
    pub context: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub constraints: String,
}

pub async fn update_relationship_metrics(
    store: &dyn GraphStore,
    args: UpdateMetricsArgs,
) -> Result<Value, OperationError> {
    let a = normalize_id(&args.persona1_id, "persona1_id")?;
    let b = normalize_id(&args.persona2_id, "persona2_id")?;
    let delta = MetricDelta::new(args.trust_delta, args.intimacy_delta, args.strength_delta);

    let updated = store.upsert_relationship_metrics(&a, &b, delta).await?;
    let names = [display_name(store, &a).await?, display_name(store, &b).await?];

    Ok(to_value(&UpdateMetricsDocument {
        success: true,
        updated_relationship: UpdatedRelationship {
            participants: [a, b],
            participant_names: names,
            trust_level: round_to(updated.trust_level, 2),
            intimacy_level: round_to(updated.intimacy_level, 2),
            relationship_strength: round_to(updated.relationship_strength, 2),
            changes: MetricChanges {
                trust_delta: args.trust_delta,
                intimacy_delta: args.intimacy_delta,
                strength_delta: args.strength_delta,
            },
        },
    }))
}

pub async fn record_interaction(
    store: &dyn GraphStore,
    args: RecordInteractionArgs,
) -> Result<Value, OperationError> {
    let new = NewInteraction::new(args.sender_id, args.recipient_id, args.content)
        .with_valence(args.emotional_valence)
        .with_impact(args.relationship_impact);

    let recorded = store.record_interaction(new).await?;
    let interaction = &recorded.interaction;

    Ok(to_value(&RecordInteractionDocument {
        success: true,
        interaction_id: interaction.interaction_id.clone(),
        recorded: RecordedSummary {
            sender_id: interaction.sender_id.clone(),
            recipient_id: interaction.recipient_id.clone(),
            content_length: interaction.content_length(),
            emotional_valence: interaction.emotional_valence,
            relationship_impact: interaction.relationship_impact,
        },
        relationship: RelationshipAfterInteraction {
            interaction_count: recorded.relationship.interaction_count,
            emotional_valence: recorded.relationship.emotional_valence,
        },
    }))
}

pub async fn analyze_persona_compatibility(
    store: &dyn GraphStore,
    args: CompatibilityArgs,
) -> Result<Value, OperationError> {
    let (p1, p2) = both_personas(store, &args.persona1_id, &args.persona2_id).await?;
    let result = compatibility(p1.attachment_style, p2.attachment_style);

    Ok(to_value(&CategoricalCompatibilityDocument {
        success: true,
        compatibility_analysis: CompatibilityAnalysis {
            persona1: PersonaRef::from(&p1),
            persona2: PersonaRef::from(&p2),
            relationship_type: args.relationship_type,
            compatibility_level: result.level.to_string(),
            analysis: result.rationale.to_string(),
            recommendations: RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
        },
    }))
}

pub async fn score_persona_compatibility(
    store: &dyn GraphStore,
    args: PairArgs,
) -> Result<Value, OperationError> {
    both_personas(store, &args.persona1_id, &args.persona2_id).await?;

    Ok(to_value(&ScoredCompatibilityDocument {
        success: true,
        compatibility_analysis: synthetic_compatibility_scores(),
    }))
}

pub async fn autonomous_strategy_selection(
    store: &dyn GraphStore,
    args: StrategyArgs,
) -> Result<Value, OperationError> {
    let persona_id = normalize_id(&args.persona_id, "persona_id")?;

    let style = match args.attachment_style.as_deref().map(str::trim) {
        Some(explicit) if !explicit.is_empty() => AttachmentStyle::parse_lenient(explicit),
        _ => match store.get_persona(&persona_id).await? {
            Some(persona) => persona.attachment_style,
            None => {
                debug!(persona_id = %persona_id, "No stored attachment style, assuming secure");
                AttachmentStyle::Secure
            }
        },
    };

    let selected = select_strategy(style, &args.conversation_context, &args.active_goals);

    Ok(to_value(&StrategySelectionDocument {
        success: true,
        strategy_selection: StrategySelection {
            persona_id,
            selected_strategy: selected,
            attachment_style: style.to_string(),
            context: args.conversation_context,
            available_strategies: candidate_strategies(style).to_vec(),
            reasoning: "Selected based on attachment style and context analysis",
        },
    }))
}

pub async fn assess_goal_progress(
    store: &dyn GraphStore,
    args: GoalProgressArgs,
) -> Result<Value, OperationError> {
    let persona_id = normalize_id(&args.persona_id, "persona_id")?;

    let mut goals = parse_goal_list(&args.goals);
    if goals.is_empty() {
        goals = store
            .list_goals(&persona_id)
            .await?
            .into_iter()
            .filter(|goal| goal.is_active())
            .map(|goal| goal.description)
            .collect();
    }
    let report = assess_goals(&goals);

    Ok(to_value(&GoalProgressDocument {
        success: true,
        goal_progress: GoalProgress {
            persona_id,
            assessed_goals: report.assessed_goals,
            overall_progress: report.overall_progress,
            assessment_timestamp: Utc::now(),
        },
    }))
}

pub async fn generate_contextual_response(
    store: &dyn GraphStore,
    args: ContextualResponseArgs,
) -> Result<Value, OperationError> {
    let persona = require_persona(store, &args.persona_id).await?;
    let style = persona.attachment_style;
    let generated = contextual_response(style, &args.context);

    Ok(to_value(&ContextualResponseDocument {
        success: true,
        contextual_response: ContextualResponseBody {
            persona_id: persona.persona_id,
            persona_name: persona.name,
            response: generated.response,
            strategy_used: generated.strategy_used,
            attachment_style: style.to_string(),
            context: generated.context,
            psychological_rationale: generated.psychological_rationale,
        },
    }))
}

pub async fn commit_relationship_state(
    store: &dyn GraphStore,
    args: PairArgs,
) -> Result<Value, OperationError> {
    let a = normalize_id(&args.persona1_id, "persona1_id")?;
    let b = normalize_id(&args.persona2_id, "persona2_id")?;
    let rel = store
        .get_relationship(&a, &b)
        .await?
        .ok_or_else(|| StorageError::relationship_not_found(&a, &b))?;

    Ok(to_value(&CommitDocument {
        success: true,
        committed: CommittedState {
            participants: [a, b],
            trust_level: rel.trust_level,
            intimacy_level: rel.intimacy_level,
            relationship_strength: rel.relationship_strength,
            timestamp: Utc::now(),
        },
    }))
}

pub async fn finalize_demo_session(
    store: &dyn GraphStore,
    store_mode: StoreMode,
) -> Result<Value, OperationError> {
    let committed_relationships = store.list_relationships().await?.len();

    Ok(to_value(&FinalizeDocument {
        success: true,
        finalized: FinalizedSession {
            committed_relationships,
            store_mode,
            timestamp: Utc::now(),
        },
    }))
}

async fn display_name(store: &dyn GraphStore, persona_id: &str) -> Result<String, StorageError> {
    Ok(store
        .get_persona(persona_id)
        .await?
        .map_or_else(|| persona_id.to_string(), |p| p.name))
}

async fn require_persona(store: &dyn GraphStore, persona_id: &str) -> Result<Persona, OperationError> {
    let persona_id = normalize_id(persona_id, "persona_id")?;
    store
        .get_persona(&persona_id)
        .await?
        .ok_or_else(|| OperationError::Invalid(format!("Persona {persona_id} not found")))
}

async fn both_personas(
    store: &dyn GraphStore,
    a: &str,
    b: &str,
) -> Result<(Persona, Persona), OperationError> {
    let first = store.get_persona(a).await?;
    let second = store.get_persona(b).await?;
    match (first, second) {
        (Some(first), Some(second)) => Ok((first, second)),
        _ => Err(OperationError::Invalid(format!(
            "Could not find both personas: {a}, {b}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lila::storage::MemoryStore;

    fn demo() -> MemoryStore {
        MemoryStore::with_demo_data().unwrap()
    }

    #[test]
    fn test_tool_names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("launch_rockets"), None);
        assert_eq!(list_result()["tools"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_missing_arguments_use_defaults() {
        let args: UpdateMetricsArgs =
            parse_args(Some(json!({"persona1_id": "lila", "persona2_id": "don"}))).unwrap();
        assert_eq!(args.trust_delta, 0.0);

        let args: CompatibilityArgs =
            parse_args(Some(json!({"persona1_id": "lila", "persona2_id": "don"}))).unwrap();
        assert_eq!(args.relationship_type, "romantic");

        assert!(parse_args::<PairArgs>(None).is_err());
    }

    #[tokio::test]
    async fn test_trust_update_rounds_and_clamps() {
        let store = demo();
        let doc = update_relationship_metrics(
            &store,
            UpdateMetricsArgs {
                persona1_id: "lila".into(),
                persona2_id: "don".into(),
                trust_delta: -10.0,
                intimacy_delta: 0.123,
                strength_delta: 0.0,
            },
        )
        .await
        .unwrap();

        let updated = &doc["updated_relationship"];
        assert_eq!(doc["success"], true);
        assert_eq!(updated["trust_level"], 0.0);
        assert_eq!(updated["intimacy_level"], 6.92);
        assert_eq!(updated["participant_names"], json!(["Lila", "Don"]));
        assert_eq!(updated["changes"]["trust_delta"], -10.0);
    }

    #[tokio::test]
    async fn test_strategy_falls_back_to_stored_style() {
        let store = demo();
        let doc = autonomous_strategy_selection(
            &store,
            parse_args(Some(json!({
                "persona_id": "don",
                "conversation_context": "This is our first meeting"
            })))
            .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(doc["strategy_selection"]["selected_strategy"], "reassurance_seeking");
        assert_eq!(doc["strategy_selection"]["attachment_style"], "anxious");

        let doc = autonomous_strategy_selection(
            &store,
            parse_args(Some(json!({"persona_id": "stranger"}))).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(doc["strategy_selection"]["selected_strategy"], "emotional_bonding");
        assert_eq!(doc["strategy_selection"]["available_strategies"][3], "trust_building");
    }

    #[tokio::test]
    async fn test_goal_progress_uses_stored_goals_when_none_given() {
        let store = demo();
        let doc = assess_goal_progress(
            &store,
            parse_args(Some(json!({"persona_id": "don"}))).unwrap(),
        )
        .await
        .unwrap();
        let progress = &doc["goal_progress"];
        assert_eq!(progress["assessed_goals"][0]["goal"], "Open up about vulnerabilities");
        assert_eq!(progress["assessed_goals"][0]["progress"], 0.1);
        assert_eq!(progress["overall_progress"], 0.1);

        let doc = assess_goal_progress(
            &store,
            parse_args(Some(json!({"persona_id": "nobody", "goals": " , "}))).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(doc["goal_progress"]["overall_progress"], 0.05);
    }

    #[tokio::test]
    async fn test_compatibility_requires_both_personas() {
        let store = demo();
        let err = analyze_persona_compatibility(
            &store,
            parse_args(Some(json!({"persona1_id": "lila", "persona2_id": "ghost"}))).unwrap(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Could not find both personas: lila, ghost");

        let doc = analyze_persona_compatibility(
            &store,
            parse_args(Some(json!({"persona1_id": "don", "persona2_id": "lila"}))).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(doc["compatibility_analysis"]["compatibility_level"], "Good");
    }

    #[tokio::test]
    async fn test_contextual_response_truncates_context() {
        let store = demo();
        let context = "x".repeat(150);
        let doc = generate_contextual_response(
            &store,
            parse_args(Some(json!({"persona_id": "Lila", "context": context}))).unwrap(),
        )
        .await
        .unwrap();
        let body = &doc["contextual_response"];
        assert_eq!(body["strategy_used"], "supportive_listening");
        assert_eq!(body["context"].as_str().unwrap().chars().count(), 103);

        let err = generate_contextual_response(
            &store,
            parse_args(Some(json!({"persona_id": "ghost", "context": "hi"}))).unwrap(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Persona ghost not found");
    }
}
