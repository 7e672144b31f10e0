//! Read-only resources under `lila://{category}/{selector}`

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use lila::storage::{
    GoalStore, GraphStore, InteractionStore, PersonaStore, RelationshipStore, StorageError,
    recent_limit,
};

use super::OperationError;
use super::documents::{
    ActiveGoalsDocument, InteractionEntry, InteractionsDocument, NameIndex, PersonaDetail,
    PersonaDocument, PersonaSummary, PersonasDocument, RelationshipDetail, RelationshipDocument,
    RelationshipSummary, RelationshipsDocument, to_value,
};

pub const MIME_JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    pub uri_template: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

const fn resource(
    uri: &'static str,
    name: &'static str,
    description: &'static str,
) -> ResourceDescriptor {
    ResourceDescriptor {
        uri,
        name,
        description,
        mime_type: MIME_JSON,
    }
}

/// Resources backed by the store
pub const RESOURCES: [ResourceDescriptor; 3] = [
    resource(
        "lila://personas/all",
        "All personas",
        "Every persona with its attachment style and personality profile",
    ),
    resource(
        "lila://relationships/all",
        "All relationships",
        "Relationship metrics between personas, strongest first",
    ),
    resource(
        "lila://goals/active",
        "Active goals",
        "Active relationship goals across all personas",
    ),
];

/// Fixed illustrative documents, served only by a session that started
/// without the graph database
pub const FALLBACK_RESOURCES: [ResourceDescriptor; 3] = [
    resource(
        "lila://emotional_climate/current",
        "Current emotional climate",
        "Safety, positivity and growth indicators for the demo pair",
    ),
    resource(
        "lila://attachment_styles/analysis",
        "Attachment style analysis",
        "Attachment compatibility matrix for the demo pair",
    ),
    resource(
        "lila://psychological_insights/trends",
        "Psychological trends",
        "Trust, intimacy and security trends with predictions",
    ),
];

pub const TEMPLATES: [ResourceTemplate; 3] = [
    ResourceTemplate {
        uri_template: "lila://personas/{persona_id}",
        name: "Persona",
        description: "Full psychological profile of one persona",
        mime_type: MIME_JSON,
    },
    ResourceTemplate {
        uri_template: "lila://relationships/{persona1_id}/{persona2_id}",
        name: "Relationship",
        description: "Metrics between two personas, in either order",
        mime_type: MIME_JSON,
    },
    ResourceTemplate {
        uri_template: "lila://interactions/recent/{count}",
        name: "Recent interactions",
        description: "Most recent interactions first, at most 50",
        mime_type: MIME_JSON,
    },
];

/// A parsed resource address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAddress {
    AllPersonas,
    Persona(String),
    AllRelationships,
    Relationship(String, String),
    RecentInteractions(String),
    ActiveGoals,
    EmotionalClimate,
    AttachmentAnalysis,
    PsychologicalTrends,
}

impl ResourceAddress {
    /// Parse `category/selector`, ignoring any `scheme://` prefix.
    pub fn parse(uri: &str) -> Option<Self> {
        let path = uri.split_once("://").map_or(uri, |(_, rest)| rest);
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        let address = match segments.as_slice() {
            ["personas", "all"] => Self::AllPersonas,
            ["personas", id] if !id.is_empty() => Self::Persona((*id).to_string()),
            ["relationships", "all"] => Self::AllRelationships,
            ["relationships", a, b] if !a.is_empty() && !b.is_empty() => {
                Self::Relationship((*a).to_string(), (*b).to_string())
            }
            ["interactions", "recent", count] => Self::RecentInteractions((*count).to_string()),
            ["goals", "active"] => Self::ActiveGoals,
            ["emotional_climate", "current"] => Self::EmotionalClimate,
            ["attachment_styles", "analysis"] => Self::AttachmentAnalysis,
            ["psychological_insights", "trends"] => Self::PsychologicalTrends,
            _ => return None,
        };
        Some(address)
    }

    pub fn is_fallback_only(&self) -> bool {
        matches!(
            self,
            Self::EmotionalClimate | Self::AttachmentAnalysis | Self::PsychologicalTrends
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AllPersonas => "personas/all",
            Self::Persona(_) => "personas/{persona_id}",
            Self::AllRelationships => "relationships/all",
            Self::Relationship(..) => "relationships/{persona1_id}/{persona2_id}",
            Self::RecentInteractions(_) => "interactions/recent/{count}",
            Self::ActiveGoals => "goals/active",
            Self::EmotionalClimate => "emotional_climate/current",
            Self::AttachmentAnalysis => "attachment_styles/analysis",
            Self::PsychologicalTrends => "psychological_insights/trends",
        }
    }
}

pub fn list_result(started_in_fallback: bool) -> Value {
    let mut resources: Vec<ResourceDescriptor> = RESOURCES.to_vec();
    if started_in_fallback {
        resources.extend(FALLBACK_RESOURCES);
    }
    json!({ "resources": resources })
}

pub fn templates_result() -> Value {
    json!({ "resourceTemplates": TEMPLATES })
}

/// Wrap a document as a `resources/read` result.
pub fn contents(uri: &str, document: &Value) -> Value {
    json!({
        "contents": [{
            "uri": uri,
            "mimeType": MIME_JSON,
            "text": document.to_string(),
        }]
    })
}

/// Build the document for an address.
pub async fn read(
    store: &dyn GraphStore,
    address: &ResourceAddress,
    uri: &str,
    started_in_fallback: bool,
) -> Result<Value, OperationError> {
    if address.is_fallback_only() && !started_in_fallback {
        return Err(OperationError::Invalid(format!(
            "Resource {uri} is only available in fallback mode"
        )));
    }

    match address {
        ResourceAddress::AllPersonas => all_personas(store).await,
        ResourceAddress::Persona(id) => persona(store, id).await,
        ResourceAddress::AllRelationships => all_relationships(store).await,
        ResourceAddress::Relationship(a, b) => relationship(store, a, b).await,
        ResourceAddress::RecentInteractions(count) => recent_interactions(store, count).await,
        ResourceAddress::ActiveGoals => {
            let goals = store.list_active_goals().await?;
            Ok(to_value(&ActiveGoalsDocument::new(goals)))
        }
        ResourceAddress::EmotionalClimate => Ok(emotional_climate()),
        ResourceAddress::AttachmentAnalysis => Ok(attachment_analysis()),
        ResourceAddress::PsychologicalTrends => Ok(psychological_trends()),
    }
}

async fn all_personas(store: &dyn GraphStore) -> Result<Value, OperationError> {
    let personas: Vec<PersonaSummary> = store
        .list_personas()
        .await?
        .iter()
        .map(PersonaSummary::from)
        .collect();

    Ok(to_value(&PersonasDocument {
        count: personas.len(),
        personas,
        last_updated: Utc::now(),
    }))
}

async fn persona(store: &dyn GraphStore, id: &str) -> Result<Value, OperationError> {
    let persona = store
        .get_persona(id)
        .await?
        .ok_or_else(|| OperationError::Invalid(format!("Persona {id} not found")))?;

    Ok(to_value(&PersonaDocument {
        persona: PersonaDetail::from(&persona),
        last_updated: Utc::now(),
    }))
}

async fn all_relationships(store: &dyn GraphStore) -> Result<Value, OperationError> {
    let names = NameIndex::from_personas(&store.list_personas().await?);
    let summaries = store
        .list_relationships()
        .await?
        .iter()
        .map(|rel| RelationshipSummary::new(rel, &names))
        .collect();

    Ok(to_value(&RelationshipsDocument::new(summaries)))
}

async fn relationship(store: &dyn GraphStore, a: &str, b: &str) -> Result<Value, OperationError> {
    let rel = store
        .get_relationship(a, b)
        .await?
        .ok_or_else(|| StorageError::relationship_not_found(a, b))?;
    let names = NameIndex::from_personas(&store.list_personas().await?);
    let (first, second) = (a.trim().to_lowercase(), b.trim().to_lowercase());

    Ok(to_value(&RelationshipDocument {
        relationship: RelationshipDetail::new(&first, &second, &rel, &names),
        last_updated: Utc::now(),
    }))
}

async fn recent_interactions(store: &dyn GraphStore, raw: &str) -> Result<Value, OperationError> {
    let requested: usize = raw
        .trim()
        .parse()
        .map_err(|_| OperationError::Invalid(format!("Invalid interaction count: {raw}")))?;

    let interactions: Vec<InteractionEntry> = store
        .list_recent_interactions(recent_limit(requested))
        .await?
        .into_iter()
        .map(InteractionEntry::from)
        .collect();
    let total_available = store.count_interactions().await?;

    Ok(to_value(&InteractionsDocument {
        count: interactions.len(),
        interactions,
        total_available,
        last_updated: Utc::now(),
    }))
}

fn emotional_climate() -> Value {
    json!({
        "overall_climate": {
            "safety_level": 8.2,
            "positivity": 7.6,
            "authenticity": 7.9,
            "growth_potential": 8.1
        },
        "risk_factors": [
            "Mild anxiety patterns in 'don' persona",
            "Need for reassurance seeking behaviors"
        ],
        "strengths": [
            "Strong secure attachment from 'lila'",
            "High openness and conscientiousness levels",
            "Active communication patterns"
        ],
        "last_updated": Utc::now()
    })
}

fn attachment_analysis() -> Value {
    json!({
        "compatibility_matrix": {
            "lila_don": {
                "overall_score": 7.8,
                "attachment_compatibility": 8.2,
                "challenges": ["Anxious-secure dynamic requires patience"],
                "strengths": ["Secure partner can provide stability"]
            }
        },
        "recommendations": [
            "Consistent reassurance for anxious attachment",
            "Gradual trust building exercises",
            "Open communication about emotional needs"
        ],
        "last_updated": Utc::now()
    })
}

fn psychological_trends() -> Value {
    json!({
        "trends": {
            "trust_evolution": {"direction": "increasing", "rate": 0.2, "confidence": "high"},
            "intimacy_development": {"direction": "steady", "rate": 0.1, "confidence": "medium"},
            "attachment_security": {"direction": "improving", "rate": 0.15, "confidence": "high"}
        },
        "predictions": {
            "next_month": "Continued trust building with minor setbacks",
            "next_quarter": "Significant intimacy breakthroughs expected"
        },
        "last_updated": Utc::now()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lila::storage::MemoryStore;

    #[test]
    fn test_parse_accepts_any_scheme() {
        assert_eq!(
            ResourceAddress::parse("lila://personas/all"),
            Some(ResourceAddress::AllPersonas)
        );
        assert_eq!(
            ResourceAddress::parse("neo4j://relationships/lila/don"),
            Some(ResourceAddress::Relationship("lila".into(), "don".into()))
        );
        assert_eq!(
            ResourceAddress::parse("interactions/recent/5"),
            Some(ResourceAddress::RecentInteractions("5".into()))
        );
        assert_eq!(ResourceAddress::parse("lila://nothing/here"), None);
        assert_eq!(ResourceAddress::parse("lila://personas/"), None);
    }

    #[test]
    fn test_fixed_documents_are_listed_only_in_fallback_sessions() {
        assert_eq!(list_result(false)["resources"].as_array().unwrap().len(), 3);
        assert_eq!(list_result(true)["resources"].as_array().unwrap().len(), 6);
        assert_eq!(
            templates_result()["resourceTemplates"][0]["uriTemplate"],
            "lila://personas/{persona_id}"
        );
    }

    #[tokio::test]
    async fn test_recent_interactions_rejects_non_numeric_count() {
        let store = MemoryStore::with_demo_data().unwrap();
        let address = ResourceAddress::parse("lila://interactions/recent/ten").unwrap();
        let err = read(&store, &address, "lila://interactions/recent/ten", true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid interaction count: ten");
    }

    #[tokio::test]
    async fn test_relationship_is_reported_in_requested_order() {
        let store = MemoryStore::with_demo_data().unwrap();
        let address = ResourceAddress::parse("lila://relationships/don/lila").unwrap();
        let doc = read(&store, &address, "lila://relationships/don/lila", true)
            .await
            .unwrap();
        assert_eq!(doc["relationship"]["persona1_id"], "don");
        assert_eq!(doc["relationship"]["persona1_name"], "Don");
        assert_eq!(doc["relationship"]["trust_level"], 7.5);
    }

    #[tokio::test]
    async fn test_fixed_documents_refused_outside_fallback_sessions() {
        let store = MemoryStore::new();
        let uri = "lila://emotional_climate/current";
        let address = ResourceAddress::parse(uri).unwrap();
        let err = read(&store, &address, uri, false).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Resource lila://emotional_climate/current is only available in fallback mode"
        );
        let doc = read(&store, &address, uri, true).await.unwrap();
        assert_eq!(doc["overall_climate"]["safety_level"], 8.2);
    }
}
