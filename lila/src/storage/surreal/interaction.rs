//! Interaction log in SurrealDB

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use surrealdb::Connection;

use super::base::SurrealStore;
use crate::models::{Interaction, NewInteraction, RecordedInteraction};
use crate::relationships::metrics;
use crate::storage::errors::StorageError;
use crate::storage::traits::{InteractionStore, recent_limit};

/// Stored with an integer millisecond timestamp so ordering is numeric.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InteractionRecord {
    interaction_id: String,
    sender_id: String,
    recipient_id: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    emotional_valence: f64,
    #[serde(default)]
    relationship_impact: f64,
    timestamp_ms: i64,
}

impl From<&Interaction> for InteractionRecord {
    fn from(interaction: &Interaction) -> Self {
        Self {
            interaction_id: interaction.interaction_id.clone(),
            sender_id: interaction.sender_id.clone(),
            recipient_id: interaction.recipient_id.clone(),
            content: interaction.content.clone(),
            emotional_valence: interaction.emotional_valence,
            relationship_impact: interaction.relationship_impact,
            timestamp_ms: interaction.timestamp.timestamp_millis(),
        }
    }
}

impl From<InteractionRecord> for Interaction {
    fn from(record: InteractionRecord) -> Self {
        Interaction {
            interaction_id: record.interaction_id,
            sender_id: record.sender_id,
            recipient_id: record.recipient_id,
            content: record.content,
            emotional_valence: record.emotional_valence.clamp(-1.0, 1.0),
            relationship_impact: record.relationship_impact,
            timestamp: DateTime::from_timestamp_millis(record.timestamp_ms).unwrap_or_else(Utc::now),
        }
    }
}

impl<C> SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    /// Undo a log entry whose relationship update failed.
    async fn remove_interaction(&self, interaction_id: &str) {
        let result = self
            .client
            .query("DELETE type::thing('interaction', $interaction_id)")
            .bind(("interaction_id", interaction_id.to_string()))
            .await
            .and_then(|response| response.check());
        if let Err(e) = result {
            tracing::warn!(interaction_id, error = %e, "Failed to roll back interaction");
        }
    }
}

#[async_trait]
impl<C> InteractionStore for SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    async fn record_interaction(
        &self,
        interaction: NewInteraction,
    ) -> Result<RecordedInteraction, StorageError> {
        let new = interaction.normalized()?;

        let _guard = self.write_lock.lock().await;
        let (id, current) = self
            .resolve_relationship(&new.sender_id, &new.recipient_id)
            .await?;
        let timestamp = self.clock.tick();
        let interaction = new.into_interaction(timestamp);

        // The log entry goes first so a rejected write leaves the edge as it was
        self.client
            .query("CREATE type::thing('interaction', $interaction_id) CONTENT $content")
            .bind(("interaction_id", interaction.interaction_id.clone()))
            .bind(("content", InteractionRecord::from(&interaction)))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to store interaction: {}", e)))?
            .check()
            .map_err(|e| StorageError::Query(format!("Failed to store interaction: {}", e)))?;

        let updated = metrics::record_interaction_at(current, interaction.emotional_valence, timestamp);
        let relationship = match self.store_relationship(id, &updated).await {
            Ok(relationship) => relationship,
            Err(err) => {
                self.remove_interaction(&interaction.interaction_id).await;
                return Err(err);
            }
        };

        tracing::debug!(
            interaction_id = %interaction.interaction_id,
            interaction_count = relationship.interaction_count,
            "Recorded interaction"
        );

        Ok(RecordedInteraction {
            interaction,
            relationship,
        })
    }

    async fn list_recent_interactions(&self, count: usize) -> Result<Vec<Interaction>, StorageError> {
        let limit = recent_limit(count);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut response = self
            .client
            .query("SELECT * FROM interaction ORDER BY timestamp_ms DESC LIMIT $limit")
            .bind(("limit", limit as i64))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to list interactions: {}", e)))?;

        let records: Vec<InteractionRecord> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to read interactions: {}", e)))?;

        Ok(records.into_iter().map(Interaction::from).collect())
    }

    async fn count_interactions(&self) -> Result<usize, StorageError> {
        self.count_table("interaction").await
    }
}
