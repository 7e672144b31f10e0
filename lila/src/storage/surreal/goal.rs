//! Goals in SurrealDB

use async_trait::async_trait;
use chrono::Utc;
use std::fmt::Debug;
use surrealdb::Connection;

use super::base::SurrealStore;
use crate::models::{Goal, normalize_id};
use crate::storage::errors::StorageError;
use crate::storage::traits::GoalStore;

#[async_trait]
impl<C> GoalStore for SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    async fn upsert_goal(&self, goal: Goal) -> Result<Goal, StorageError> {
        let mut goal = goal.normalized()?;
        let _guard = self.write_lock.lock().await;
        self.require_persona(&goal.persona_id).await?;

        let mut response = self
            .client
            .query("SELECT * FROM type::thing('goal', $goal_id)")
            .bind(("goal_id", goal.goal_id.clone()))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to get goal: {}", e)))?;
        let existing: Vec<Goal> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to read goal: {}", e)))?;
        if let Some(existing) = existing.first() {
            goal.created_at = existing.created_at;
        }
        goal.updated_at = Utc::now();

        let mut response = self
            .client
            .query("UPSERT type::thing('goal', $goal_id) CONTENT $content")
            .bind(("goal_id", goal.goal_id.clone()))
            .bind(("content", goal.clone()))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to store goal: {}", e)))?;
        let stored: Vec<Goal> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to store goal: {}", e)))?;

        stored
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::Internal("Goal upsert returned no record".to_string()))
    }

    async fn list_goals(&self, persona_id: &str) -> Result<Vec<Goal>, StorageError> {
        let persona_id = normalize_id(persona_id, "persona_id")?;
        let mut response = self
            .client
            .query("SELECT * FROM goal WHERE persona_id = $persona_id ORDER BY created_at ASC")
            .bind(("persona_id", persona_id))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to list goals: {}", e)))?;

        response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to read goals: {}", e)))
    }

    async fn list_active_goals(&self) -> Result<Vec<Goal>, StorageError> {
        let mut response = self
            .client
            .query("SELECT * FROM goal WHERE status = 'active' ORDER BY persona_id ASC, created_at ASC")
            .await
            .map_err(|e| StorageError::Query(format!("Failed to list active goals: {}", e)))?;

        response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to read active goals: {}", e)))
    }
}
