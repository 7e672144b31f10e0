//! Storage abstractions and implementations
//!
//! Two backends implement the [`GraphStore`] trait family with the same
//! observable semantics:
//!
//! - **SurrealStore**: personas as graph nodes and relationships as edges in
//!   SurrealDB, embedded (`mem://`, `rocksdb://`) or remote (`ws://`,
//!   `http://`).
//! - **MemoryStore**: a process-local store seeded with demo data, used when
//!   the database is unreachable.
//!
//! [`StoreHandle`] decides which of the two serves a request and performs the
//! one-way switch to the in-memory store after an outage.

pub mod config;
pub mod errors;
pub mod handle;
pub mod memory;
pub mod seed;
pub mod surreal;
pub mod traits;

pub use config::{StorageBackend, StorageConfig, SurrealDBAuth, SurrealDBAuthType, SurrealDBConfig};
pub use errors::{StorageError, StorageResult};
pub use handle::{FallbackSettings, StoreHandle, StoreMode};
pub use memory::MemoryStore;
pub use surreal::{AnySurrealStore, SurrealStore};
pub use traits::{
    BaseStore, GoalStore, GraphStore, InteractionStore, MAX_RECENT_INTERACTIONS, PersonaStore,
    RelationshipStore, recent_limit,
};

use std::sync::Arc;

use crate::relationships::MissingRelationshipPolicy;

/// Open the configured backend.
///
/// With the SurrealDB backend the connection is retried per
/// [`SurrealDBConfig`]. When every attempt fails the handle starts in
/// fallback mode if `fallback_on_unavailable` is set; otherwise the
/// connection error is returned.
pub async fn create_store(config: &StorageConfig) -> StorageResult<StoreHandle> {
    let fallback = FallbackSettings::from(config);

    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory store");
            StoreHandle::fallback_from(fallback)
        }
        StorageBackend::SurrealDB => {
            let policy = config
                .missing_relationship
                .unwrap_or(MissingRelationshipPolicy::Reject);
            match surreal::connect_with_retry(&config.surrealdb, policy).await {
                Ok(store) => {
                    tracing::info!(
                        endpoint = %config.surrealdb.endpoint,
                        namespace = %config.surrealdb.namespace,
                        database = %config.surrealdb.database,
                        "Connected to SurrealDB graph store"
                    );
                    Ok(StoreHandle::graph(Arc::new(store), fallback))
                }
                Err(e) if config.fallback_on_unavailable => {
                    tracing::error!(error = %e, "SurrealDB unavailable, starting in fallback mode");
                    StoreHandle::fallback_from(fallback)
                }
                Err(e) => Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unreachable_surrealdb() -> SurrealDBConfig {
        SurrealDBConfig {
            endpoint: "unsupported://localhost:1".to_string(),
            max_connect_attempts: 1,
            retry_delay: Duration::from_millis(0),
            ..SurrealDBConfig::default()
        }
    }

    #[tokio::test]
    async fn test_memory_backend_starts_in_fallback() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..StorageConfig::default()
        };
        let handle = create_store(&config).await.unwrap();
        assert_eq!(handle.mode().await, StoreMode::Fallback);
        assert!(handle.store().await.get_persona("lila").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_embedded_surrealdb_starts_in_graph_mode() {
        let config = StorageConfig {
            surrealdb: SurrealDBConfig::in_memory(),
            ..StorageConfig::default()
        };
        let handle = create_store(&config).await.unwrap();
        assert_eq!(handle.mode().await, StoreMode::Graph);
        assert_eq!(handle.store().await.backend_name(), "surrealdb");
    }

    #[tokio::test]
    async fn test_unreachable_database_falls_back_when_allowed() {
        let config = StorageConfig {
            surrealdb: unreachable_surrealdb(),
            ..StorageConfig::default()
        };
        let handle = create_store(&config).await.unwrap();
        assert!(handle.mode().await.is_fallback());
    }

    #[tokio::test]
    async fn test_unreachable_database_is_fatal_without_fallback() {
        let config = StorageConfig {
            surrealdb: unreachable_surrealdb(),
            fallback_on_unavailable: false,
            ..StorageConfig::default()
        };
        let err = create_store(&config).await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
    }
}
