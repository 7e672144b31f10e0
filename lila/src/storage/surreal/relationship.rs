//! Relationship edges in SurrealDB
//!
//! Edges are created with `RELATE persona->relationship->persona`. The
//! creating order is kept in `persona1_id`/`persona2_id`; lookups match the
//! pair in either direction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use surrealdb::{Connection, RecordId};

use super::base::SurrealStore;
use crate::models::{DEFAULT_METRIC, Relationship, normalize_id};
use crate::relationships::{MetricDelta, MissingRelationshipPolicy, apply_delta};
use crate::storage::errors::StorageError;
use crate::storage::traits::RelationshipStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RelationshipRecord {
    #[serde(default, skip_serializing)]
    pub(crate) id: Option<RecordId>,
    persona1_id: String,
    persona2_id: String,
    #[serde(default)]
    trust_level: Option<f64>,
    #[serde(default)]
    intimacy_level: Option<f64>,
    #[serde(default)]
    relationship_strength: Option<f64>,
    #[serde(default)]
    interaction_count: Option<u64>,
    #[serde(default)]
    emotional_valence: Option<f64>,
    #[serde(default)]
    relationship_type: Option<String>,
    #[serde(default)]
    last_interaction: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<&Relationship> for RelationshipRecord {
    fn from(rel: &Relationship) -> Self {
        Self {
            id: None,
            persona1_id: rel.persona1_id.clone(),
            persona2_id: rel.persona2_id.clone(),
            trust_level: Some(rel.trust_level),
            intimacy_level: Some(rel.intimacy_level),
            relationship_strength: Some(rel.relationship_strength),
            interaction_count: Some(rel.interaction_count),
            emotional_valence: Some(rel.emotional_valence),
            relationship_type: Some(rel.relationship_type.clone()),
            last_interaction: rel.last_interaction,
            created_at: Some(rel.created_at),
            updated_at: Some(rel.updated_at),
        }
    }
}

impl From<RelationshipRecord> for Relationship {
    fn from(record: RelationshipRecord) -> Self {
        let now = Utc::now();
        let created_at = record.created_at.unwrap_or(now);
        Relationship {
            persona1_id: record.persona1_id,
            persona2_id: record.persona2_id,
            trust_level: record.trust_level.unwrap_or(DEFAULT_METRIC),
            intimacy_level: record.intimacy_level.unwrap_or(DEFAULT_METRIC),
            relationship_strength: record.relationship_strength.unwrap_or(DEFAULT_METRIC),
            interaction_count: record.interaction_count.unwrap_or(0),
            emotional_valence: record.emotional_valence.unwrap_or(0.0),
            relationship_type: record
                .relationship_type
                .unwrap_or_else(|| Relationship::UNKNOWN_TYPE.to_string()),
            last_interaction: record.last_interaction,
            created_at,
            updated_at: record.updated_at.unwrap_or(created_at),
        }
        .clamped()
    }
}

fn persona_thing(persona_id: &str) -> RecordId {
    RecordId::from(("persona", persona_id))
}

impl<C> SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    /// Find the pair's edge in either direction.
    pub(crate) async fn find_relationship(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<RelationshipRecord>, StorageError> {
        let mut response = self
            .client
            .query(
                "SELECT * FROM relationship \
                 WHERE (persona1_id = $a AND persona2_id = $b) \
                 OR (persona1_id = $b AND persona2_id = $a) \
                 LIMIT 1",
            )
            .bind(("a", a.to_string()))
            .bind(("b", b.to_string()))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to get relationship: {}", e)))?;

        let records: Vec<RelationshipRecord> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to read relationship: {}", e)))?;

        Ok(records.into_iter().next())
    }

    /// Create the edge. Callers hold the write lock and have checked that
    /// both personas exist and the pair is unrelated.
    pub(crate) async fn insert_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<RelationshipRecord, StorageError> {
        let mut response = self
            .client
            .query("RELATE $from->relationship->$to CONTENT $content")
            .bind(("from", persona_thing(&relationship.persona1_id)))
            .bind(("to", persona_thing(&relationship.persona2_id)))
            .bind(("content", RelationshipRecord::from(relationship)))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to create relationship: {}", e)))?;

        let created: Vec<RelationshipRecord> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to create relationship: {}", e)))?;

        created.into_iter().next().ok_or_else(|| {
            StorageError::Internal("Relationship creation returned no record".to_string())
        })
    }

    /// Overwrite the metric fields of an existing edge.
    pub(crate) async fn store_relationship(
        &self,
        id: RecordId,
        relationship: &Relationship,
    ) -> Result<Relationship, StorageError> {
        let mut response = self
            .client
            .query("UPDATE $id MERGE $patch")
            .bind(("id", id))
            .bind(("patch", RelationshipRecord::from(relationship)))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to update relationship: {}", e)))?;

        let updated: Vec<RelationshipRecord> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to update relationship: {}", e)))?;

        updated
            .into_iter()
            .next()
            .map(Relationship::from)
            .ok_or_else(|| {
                StorageError::relationship_not_found(
                    &relationship.persona1_id,
                    &relationship.persona2_id,
                )
            })
    }

    /// Resolve the pair's edge, creating a default one when the policy
    /// allows it. Callers hold the write lock.
    pub(crate) async fn resolve_relationship(
        &self,
        a: &str,
        b: &str,
    ) -> Result<(RecordId, Relationship), StorageError> {
        let record = match self.find_relationship(a, b).await? {
            Some(record) => record,
            None => match self.policy {
                MissingRelationshipPolicy::Reject => {
                    return Err(StorageError::relationship_not_found(a, b));
                }
                MissingRelationshipPolicy::CreateDefault => {
                    self.require_persona(a).await?;
                    self.require_persona(b).await?;
                    tracing::debug!(persona1_id = a, persona2_id = b, "Creating default relationship");
                    self.insert_relationship(&Relationship::new(a, b)?).await?
                }
            },
        };

        let id = record.id.clone().ok_or_else(|| {
            StorageError::Internal(format!("Relationship between {} and {} has no id", a, b))
        })?;
        Ok((id, Relationship::from(record)))
    }
}

#[async_trait]
impl<C> RelationshipStore for SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    async fn get_relationship(
        &self,
        persona1_id: &str,
        persona2_id: &str,
    ) -> Result<Option<Relationship>, StorageError> {
        let a = normalize_id(persona1_id, "persona1_id")?;
        let b = normalize_id(persona2_id, "persona2_id")?;
        Ok(self.find_relationship(&a, &b).await?.map(Relationship::from))
    }

    async fn list_relationships(&self) -> Result<Vec<Relationship>, StorageError> {
        let mut response = self
            .client
            .query(
                "SELECT * FROM relationship \
                 ORDER BY relationship_strength DESC, persona1_id ASC, persona2_id ASC",
            )
            .await
            .map_err(|e| StorageError::Query(format!("Failed to list relationships: {}", e)))?;

        let records: Vec<RelationshipRecord> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to read relationships: {}", e)))?;

        Ok(records.into_iter().map(Relationship::from).collect())
    }

    async fn create_relationship(
        &self,
        relationship: Relationship,
    ) -> Result<Relationship, StorageError> {
        let relationship = relationship.normalized()?;
        let _guard = self.write_lock.lock().await;

        self.require_persona(&relationship.persona1_id).await?;
        self.require_persona(&relationship.persona2_id).await?;
        if self
            .find_relationship(&relationship.persona1_id, &relationship.persona2_id)
            .await?
            .is_some()
        {
            return Err(StorageError::AlreadyExists(format!(
                "Relationship between {} and {}",
                relationship.persona1_id, relationship.persona2_id
            )));
        }

        Ok(self.insert_relationship(&relationship).await?.into())
    }

    async fn upsert_relationship_metrics(
        &self,
        persona1_id: &str,
        persona2_id: &str,
        delta: MetricDelta,
    ) -> Result<Relationship, StorageError> {
        let a = normalize_id(persona1_id, "persona1_id")?;
        let b = normalize_id(persona2_id, "persona2_id")?;
        let delta = delta.validated()?;

        let _guard = self.write_lock.lock().await;
        let (id, current) = self.resolve_relationship(&a, &b).await?;
        let updated = apply_delta(current, delta);
        self.store_relationship(id, &updated).await
    }

    fn missing_relationship_policy(&self) -> MissingRelationshipPolicy {
        self.policy
    }
}
