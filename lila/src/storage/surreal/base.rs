//! Base SurrealDB store

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;
use surrealdb::{Connection, Surreal};
use tokio::sync::Mutex;

use super::schema;
use crate::models::InteractionClock;
use crate::relationships::MissingRelationshipPolicy;
use crate::storage::errors::StorageError;
use crate::storage::traits::{BaseStore, GraphStore};

/// Tables owned by this store, in deletion order
pub(crate) const TABLES: [&str; 4] = ["relationship", "interaction", "goal", "persona"];

/// Graph-backed store on SurrealDB
#[derive(Debug, Clone)]
pub struct SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    pub(crate) client: Surreal<C>,
    pub(crate) policy: MissingRelationshipPolicy,
    /// Serializes read-modify-write cycles on relationships
    pub(crate) write_lock: Arc<Mutex<()>>,
    pub(crate) clock: Arc<InteractionClock>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: usize,
}

impl<C> SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    /// Select the namespace and database, then define the schema.
    pub async fn new(
        client: Surreal<C>,
        namespace: &str,
        database: &str,
        policy: MissingRelationshipPolicy,
    ) -> Result<Self, StorageError> {
        client.use_ns(namespace).use_db(database).await.map_err(|e| {
            StorageError::Connection(format!("Failed to set namespace/database: {}", e))
        })?;

        schema::initialize_schema(&client).await?;

        Ok(Self {
            client,
            policy,
            write_lock: Arc::new(Mutex::new(())),
            clock: Arc::new(InteractionClock::new()),
        })
    }

    pub fn with_policy(mut self, policy: MissingRelationshipPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &Surreal<C> {
        &self.client
    }

    pub(crate) async fn count_table(&self, table: &'static str) -> Result<usize, StorageError> {
        let mut response = self
            .client
            .query(format!("SELECT count() AS count FROM {} GROUP ALL", table))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to count {}: {}", table, e)))?;
        let row: Option<CountRow> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to read {} count: {}", table, e)))?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }
}

#[async_trait]
impl<C> BaseStore for SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    async fn health_check(&self) -> Result<bool, StorageError> {
        self.client
            .query("INFO FOR DB")
            .await
            .map_err(|e| StorageError::Connection(format!("Health check failed: {}", e)))?
            .check()
            .map_err(|e| StorageError::Connection(format!("Health check failed: {}", e)))?;

        Ok(true)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        for table in TABLES {
            self.client
                .query(format!("DELETE {}", table))
                .await
                .map_err(|e| StorageError::Query(format!("Failed to clear {}: {}", table, e)))?
                .check()
                .map_err(|e| StorageError::Query(format!("Failed to clear {}: {}", table, e)))?;
        }
        Ok(())
    }

    async fn get_metadata(&self) -> Result<serde_json::Value, StorageError> {
        Ok(serde_json::json!({
            "type": "surrealdb",
            "persona_count": self.count_table("persona").await?,
            "relationship_count": self.count_table("relationship").await?,
            "interaction_count": self.count_table("interaction").await?,
            "goal_count": self.count_table("goal").await?,
            "missing_relationship_policy": self.policy.to_string(),
        }))
    }

    async fn close(&self) -> Result<(), StorageError> {
        tracing::debug!("Closing SurrealDB store");
        Ok(())
    }
}

impl<C> GraphStore for SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    fn backend_name(&self) -> &'static str {
        "surrealdb"
    }
}
