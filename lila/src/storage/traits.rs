//! Trait definitions for the relationship graph stores

use async_trait::async_trait;
use std::fmt::Debug;

use crate::models::{Goal, Interaction, NewInteraction, Persona, RecordedInteraction, Relationship};
use crate::relationships::{MetricDelta, MissingRelationshipPolicy};
use crate::storage::errors::StorageError;

/// Upper bound on how many interactions a single listing returns.
pub const MAX_RECENT_INTERACTIONS: usize = 50;

/// Base trait for all storage implementations
#[async_trait]
pub trait BaseStore: Send + Sync + 'static + Debug {
    /// Check if the store is healthy and available
    async fn health_check(&self) -> std::result::Result<bool, StorageError>;

    /// Clear all data in the store
    async fn clear(&self) -> std::result::Result<(), StorageError>;

    /// Get metadata about the store
    async fn get_metadata(&self) -> std::result::Result<serde_json::Value, StorageError>;

    /// Close connections and release resources
    async fn close(&self) -> std::result::Result<(), StorageError>;
}

/// Persona operations
#[async_trait]
pub trait PersonaStore: BaseStore {
    async fn get_persona(&self, persona_id: &str) -> std::result::Result<Option<Persona>, StorageError>;

    /// All personas ordered by name
    async fn list_personas(&self) -> std::result::Result<Vec<Persona>, StorageError>;

    /// Insert or replace a persona. Names must stay unique across personas.
    async fn upsert_persona(&self, persona: Persona) -> std::result::Result<Persona, StorageError>;

    /// Delete a persona together with its relationships, interactions and
    /// goals. Returns whether the persona existed.
    async fn delete_persona(&self, persona_id: &str) -> std::result::Result<bool, StorageError>;
}

/// Relationship operations. Pairs are unordered: `(a, b)` and `(b, a)`
/// address the same record.
#[async_trait]
pub trait RelationshipStore: BaseStore {
    async fn get_relationship(
        &self,
        persona1_id: &str,
        persona2_id: &str,
    ) -> std::result::Result<Option<Relationship>, StorageError>;

    /// All relationships ordered by strength, strongest first
    async fn list_relationships(&self) -> std::result::Result<Vec<Relationship>, StorageError>;

    /// Create a relationship. Both personas must exist and the pair must not
    /// already be related.
    async fn create_relationship(
        &self,
        relationship: Relationship,
    ) -> std::result::Result<Relationship, StorageError>;

    /// Apply clamped metric deltas to the pair's relationship.
    ///
    /// A missing relationship is handled per
    /// [`RelationshipStore::missing_relationship_policy`].
    async fn upsert_relationship_metrics(
        &self,
        persona1_id: &str,
        persona2_id: &str,
        delta: MetricDelta,
    ) -> std::result::Result<Relationship, StorageError>;

    fn missing_relationship_policy(&self) -> MissingRelationshipPolicy;
}

/// Interaction operations
#[async_trait]
pub trait InteractionStore: BaseStore {
    /// Count the interaction against the pair's relationship, blend its
    /// valence, then store the immutable interaction record.
    async fn record_interaction(
        &self,
        interaction: NewInteraction,
    ) -> std::result::Result<RecordedInteraction, StorageError>;

    /// Most recent first, at most `min(count, MAX_RECENT_INTERACTIONS)` items
    async fn list_recent_interactions(
        &self,
        count: usize,
    ) -> std::result::Result<Vec<Interaction>, StorageError>;

    async fn count_interactions(&self) -> std::result::Result<usize, StorageError>;
}

/// Goal operations
#[async_trait]
pub trait GoalStore: BaseStore {
    /// Insert or replace a goal. The owning persona must exist.
    async fn upsert_goal(&self, goal: Goal) -> std::result::Result<Goal, StorageError>;

    async fn list_goals(&self, persona_id: &str) -> std::result::Result<Vec<Goal>, StorageError>;

    /// Active goals across all personas, ordered by owner then creation time
    async fn list_active_goals(&self) -> std::result::Result<Vec<Goal>, StorageError>;
}

/// The full capability set the protocol surface relies on
#[async_trait]
pub trait GraphStore: PersonaStore + RelationshipStore + InteractionStore + GoalStore {
    /// Short backend name, e.g. `"surrealdb"` or `"memory"`
    fn backend_name(&self) -> &'static str;
}

/// Clamp a requested interaction count to the listing limit.
pub fn recent_limit(count: usize) -> usize {
    count.min(MAX_RECENT_INTERACTIONS)
}
