//! Store handle with one-way degradation to the in-memory store.
//!
//! The handle starts either on the graph backend or already in fallback
//! mode. When a graph operation fails in a way that may mean the database is
//! gone, [`StoreHandle::observe`] runs a health check and, if that fails
//! too, swaps in a [`MemoryStore`] for the rest of the process lifetime.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::relationships::MissingRelationshipPolicy;
use crate::storage::config::StorageConfig;
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::memory::MemoryStore;
use crate::storage::traits::GraphStore;

/// Which store currently serves requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Graph,
    Fallback,
}

impl StoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreMode::Graph => "graph",
            StoreMode::Fallback => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StoreMode::Fallback)
    }
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to build the in-memory store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackSettings {
    pub seed_demo_data: bool,
    pub missing_relationship: Option<MissingRelationshipPolicy>,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            missing_relationship: None,
        }
    }
}

impl From<&StorageConfig> for FallbackSettings {
    fn from(config: &StorageConfig) -> Self {
        Self {
            seed_demo_data: config.seed_demo_data,
            missing_relationship: config.missing_relationship,
        }
    }
}

impl FallbackSettings {
    pub fn build(&self) -> StorageResult<MemoryStore> {
        let store = if self.seed_demo_data {
            MemoryStore::with_demo_data()?
        } else {
            MemoryStore::new()
        };
        Ok(match self.missing_relationship {
            Some(policy) => store.with_policy(policy),
            None => store,
        })
    }
}

struct Active {
    store: Arc<dyn GraphStore>,
    mode: StoreMode,
}

/// Shared entry point to whichever store is active
pub struct StoreHandle {
    active: RwLock<Active>,
    fallback: FallbackSettings,
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl StoreHandle {
    /// Serve from the graph backend, degrading on outage.
    pub fn graph(store: Arc<dyn GraphStore>, fallback: FallbackSettings) -> Self {
        Self {
            active: RwLock::new(Active {
                store,
                mode: StoreMode::Graph,
            }),
            fallback,
        }
    }

    /// Serve from an in-memory store from the start.
    pub fn fallback(store: MemoryStore) -> Self {
        Self {
            active: RwLock::new(Active {
                store: Arc::new(store),
                mode: StoreMode::Fallback,
            }),
            fallback: FallbackSettings::default(),
        }
    }

    /// Build a fallback handle from settings.
    pub fn fallback_from(settings: FallbackSettings) -> StorageResult<Self> {
        let mut handle = Self::fallback(settings.build()?);
        handle.fallback = settings;
        Ok(handle)
    }

    pub async fn store(&self) -> Arc<dyn GraphStore> {
        self.active.read().await.store.clone()
    }

    pub async fn mode(&self) -> StoreMode {
        self.active.read().await.mode
    }

    /// Active store and mode read under the same lock
    pub async fn snapshot(&self) -> (Arc<dyn GraphStore>, StoreMode) {
        let active = self.active.read().await;
        (active.store.clone(), active.mode)
    }

    /// Inspect a failed operation. Returns whether the handle switched to
    /// fallback mode because of it.
    pub async fn observe(&self, err: &StorageError) -> bool {
        if !err.may_indicate_outage() {
            return false;
        }

        let (store, mode) = self.snapshot().await;
        if mode.is_fallback() {
            return false;
        }

        match store.health_check().await {
            Ok(true) => false,
            Ok(false) => self.degrade("health check reported unhealthy").await,
            Err(e) => self.degrade(&e.to_string()).await,
        }
    }

    /// Switch to the in-memory store. No-op when already degraded.
    pub async fn degrade(&self, reason: &str) -> bool {
        let replacement = match self.fallback.build() {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "Could not build the fallback store");
                return false;
            }
        };

        let mut active = self.active.write().await;
        if active.mode.is_fallback() {
            return false;
        }
        tracing::error!(
            backend = active.store.backend_name(),
            reason,
            "Graph store unavailable, switching to in-memory fallback"
        );
        active.store = Arc::new(replacement);
        active.mode = StoreMode::Fallback;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Goal, Interaction, NewInteraction, Persona, RecordedInteraction, Relationship};
    use crate::relationships::MetricDelta;
    use crate::storage::traits::*;
    use async_trait::async_trait;

    /// Every call fails as if the database went away.
    #[derive(Debug)]
    struct UnreachableStore;

    fn down<T>() -> Result<T, StorageError> {
        Err(StorageError::Connection("connection refused".to_string()))
    }

    #[async_trait]
    impl BaseStore for UnreachableStore {
        async fn health_check(&self) -> Result<bool, StorageError> {
            down()
        }
        async fn clear(&self) -> Result<(), StorageError> {
            down()
        }
        async fn get_metadata(&self) -> Result<serde_json::Value, StorageError> {
            down()
        }
        async fn close(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PersonaStore for UnreachableStore {
        async fn get_persona(&self, _: &str) -> Result<Option<Persona>, StorageError> {
            down()
        }
        async fn list_personas(&self) -> Result<Vec<Persona>, StorageError> {
            down()
        }
        async fn upsert_persona(&self, _: Persona) -> Result<Persona, StorageError> {
            down()
        }
        async fn delete_persona(&self, _: &str) -> Result<bool, StorageError> {
            down()
        }
    }

    #[async_trait]
    impl RelationshipStore for UnreachableStore {
        async fn get_relationship(&self, _: &str, _: &str) -> Result<Option<Relationship>, StorageError> {
            down()
        }
        async fn list_relationships(&self) -> Result<Vec<Relationship>, StorageError> {
            down()
        }
        async fn create_relationship(&self, _: Relationship) -> Result<Relationship, StorageError> {
            down()
        }
        async fn upsert_relationship_metrics(
            &self,
            _: &str,
            _: &str,
            _: MetricDelta,
        ) -> Result<Relationship, StorageError> {
            down()
        }
        fn missing_relationship_policy(&self) -> MissingRelationshipPolicy {
            MissingRelationshipPolicy::Reject
        }
    }

    #[async_trait]
    impl InteractionStore for UnreachableStore {
        async fn record_interaction(&self, _: NewInteraction) -> Result<RecordedInteraction, StorageError> {
            down()
        }
        async fn list_recent_interactions(&self, _: usize) -> Result<Vec<Interaction>, StorageError> {
            down()
        }
        async fn count_interactions(&self) -> Result<usize, StorageError> {
            down()
        }
    }

    #[async_trait]
    impl GoalStore for UnreachableStore {
        async fn upsert_goal(&self, _: Goal) -> Result<Goal, StorageError> {
            down()
        }
        async fn list_goals(&self, _: &str) -> Result<Vec<Goal>, StorageError> {
            down()
        }
        async fn list_active_goals(&self) -> Result<Vec<Goal>, StorageError> {
            down()
        }
    }

    impl GraphStore for UnreachableStore {
        fn backend_name(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_outage_switches_to_seeded_fallback() {
        let handle = StoreHandle::graph(Arc::new(UnreachableStore), FallbackSettings::default());
        assert_eq!(handle.mode().await, StoreMode::Graph);

        let err = handle.store().await.list_personas().await.unwrap_err();
        assert!(handle.observe(&err).await);
        assert_eq!(handle.mode().await, StoreMode::Fallback);

        let store = handle.store().await;
        assert_eq!(store.backend_name(), "memory");
        assert_eq!(store.list_personas().await.unwrap().len(), 2);

        // Degradation is one-way
        assert!(!handle.observe(&err).await);
    }

    #[tokio::test]
    async fn test_request_errors_do_not_degrade() {
        let handle = StoreHandle::graph(Arc::new(UnreachableStore), FallbackSettings::default());
        let not_found = StorageError::relationship_not_found("a", "b");
        assert!(!handle.observe(&not_found).await);
        assert_eq!(handle.mode().await, StoreMode::Graph);
    }

    #[tokio::test]
    async fn test_healthy_graph_store_is_kept() {
        let graph: Arc<dyn GraphStore> = Arc::new(MemoryStore::new());
        let handle = StoreHandle::graph(graph, FallbackSettings::default());
        let transient = StorageError::Query("syntax error".to_string());
        assert!(!handle.observe(&transient).await);
        assert_eq!(handle.mode().await, StoreMode::Graph);
    }

    #[tokio::test]
    async fn test_fallback_settings_apply_policy_override() {
        let handle = StoreHandle::fallback_from(FallbackSettings {
            seed_demo_data: false,
            missing_relationship: Some(MissingRelationshipPolicy::Reject),
        })
        .unwrap();
        let store = handle.store().await;
        assert!(store.list_personas().await.unwrap().is_empty());
        assert_eq!(
            store.missing_relationship_policy(),
            MissingRelationshipPolicy::Reject
        );
        assert!(handle.mode().await.is_fallback());
    }
}
