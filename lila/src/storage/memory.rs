//! In-memory fallback store.
//!
//! Every map lives behind one [`tokio::sync::RwLock`], so metric updates on
//! the same relationship are serialized and the clamp-then-store cycle can
//! not interleave.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

use crate::models::{
    Goal, Interaction, InteractionClock, NewInteraction, Persona, RecordedInteraction,
    Relationship, normalize_id,
};
use crate::relationships::{MetricDelta, MissingRelationshipPolicy, apply_delta, metrics};
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::seed::demo_dataset;
use crate::storage::traits::{
    BaseStore, GoalStore, GraphStore, InteractionStore, PersonaStore, RelationshipStore,
    recent_limit,
};

type PairKey = (String, String);

#[derive(Debug, Default)]
struct MemoryState {
    personas: HashMap<String, Persona>,
    /// Keyed in creation order; lookups try both orders
    relationships: HashMap<PairKey, Relationship>,
    /// Front is the most recent
    interactions: VecDeque<Interaction>,
    goals: HashMap<String, Vec<Goal>>,
}

impl MemoryState {
    fn pair_key(&self, a: &str, b: &str) -> Option<PairKey> {
        let forward = (a.to_string(), b.to_string());
        if self.relationships.contains_key(&forward) {
            return Some(forward);
        }
        let reverse = (b.to_string(), a.to_string());
        self.relationships.contains_key(&reverse).then_some(reverse)
    }

    fn require_persona(&self, persona_id: &str) -> StorageResult<()> {
        if self.personas.contains_key(persona_id) {
            Ok(())
        } else {
            Err(StorageError::NotFound(format!(
                "Persona {} not found",
                persona_id
            )))
        }
    }

    /// Resolve the pair's key, creating a default relationship when the
    /// policy allows it.
    fn resolve_pair(
        &mut self,
        a: &str,
        b: &str,
        policy: MissingRelationshipPolicy,
    ) -> StorageResult<PairKey> {
        if let Some(key) = self.pair_key(a, b) {
            return Ok(key);
        }
        match policy {
            MissingRelationshipPolicy::Reject => Err(StorageError::relationship_not_found(a, b)),
            MissingRelationshipPolicy::CreateDefault => {
                self.require_persona(a)?;
                self.require_persona(b)?;
                let relationship = Relationship::new(a, b)?;
                let key = (a.to_string(), b.to_string());
                tracing::debug!(persona1_id = a, persona2_id = b, "Creating default relationship");
                self.relationships.insert(key.clone(), relationship);
                Ok(key)
            }
        }
    }
}

/// Process-local store used when the graph database is unavailable.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    policy: MissingRelationshipPolicy,
    clock: InteractionClock,
}

impl MemoryStore {
    /// An empty store with the `CreateDefault` policy.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            policy: MissingRelationshipPolicy::CreateDefault,
            clock: InteractionClock::new(),
        }
    }

    /// A store seeded with the demo dataset.
    pub fn with_demo_data() -> StorageResult<Self> {
        let mut state = MemoryState::default();
        seed(&mut state)?;
        Ok(Self {
            state: RwLock::new(state),
            ..Self::new()
        })
    }

    pub fn with_policy(mut self, policy: MissingRelationshipPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Drop everything and restore the demo dataset.
    pub async fn reset(&self) -> StorageResult<()> {
        let mut state = self.state.write().await;
        *state = MemoryState::default();
        seed(&mut state)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn seed(state: &mut MemoryState) -> StorageResult<()> {
    let data = demo_dataset()?;
    for persona in data.personas {
        state.personas.insert(persona.persona_id.clone(), persona);
    }
    for relationship in data.relationships {
        let key = (
            relationship.persona1_id.clone(),
            relationship.persona2_id.clone(),
        );
        state.relationships.insert(key, relationship);
    }
    for interaction in data.interactions {
        state.interactions.push_back(interaction);
    }
    for goal in data.goals {
        state
            .goals
            .entry(goal.persona_id.clone())
            .or_default()
            .push(goal);
    }
    Ok(())
}

#[async_trait]
impl BaseStore for MemoryStore {
    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.state.write().await = MemoryState::default();
        Ok(())
    }

    async fn get_metadata(&self) -> Result<serde_json::Value, StorageError> {
        let state = self.state.read().await;
        Ok(serde_json::json!({
            "type": "memory",
            "persona_count": state.personas.len(),
            "relationship_count": state.relationships.len(),
            "interaction_count": state.interactions.len(),
            "goal_count": state.goals.values().map(Vec::len).sum::<usize>(),
            "missing_relationship_policy": self.policy.to_string(),
        }))
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[async_trait]
impl PersonaStore for MemoryStore {
    async fn get_persona(&self, persona_id: &str) -> Result<Option<Persona>, StorageError> {
        let persona_id = normalize_id(persona_id, "persona_id")?;
        Ok(self.state.read().await.personas.get(&persona_id).cloned())
    }

    async fn list_personas(&self) -> Result<Vec<Persona>, StorageError> {
        let mut personas: Vec<Persona> =
            self.state.read().await.personas.values().cloned().collect();
        personas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(personas)
    }

    async fn upsert_persona(&self, persona: Persona) -> Result<Persona, StorageError> {
        let mut persona = persona.normalized()?;
        let mut state = self.state.write().await;

        if let Some(clash) = state
            .personas
            .values()
            .find(|p| p.name == persona.name && p.persona_id != persona.persona_id)
        {
            return Err(StorageError::AlreadyExists(format!(
                "Persona name {} is already used by {}",
                persona.name, clash.persona_id
            )));
        }

        if let Some(existing) = state.personas.get(&persona.persona_id) {
            persona.created_at = existing.created_at;
        }
        persona.updated_at = chrono::Utc::now();
        state
            .personas
            .insert(persona.persona_id.clone(), persona.clone());
        Ok(persona)
    }

    async fn delete_persona(&self, persona_id: &str) -> Result<bool, StorageError> {
        let persona_id = normalize_id(persona_id, "persona_id")?;
        let mut state = self.state.write().await;
        if state.personas.remove(&persona_id).is_none() {
            return Ok(false);
        }
        state.relationships.retain(|_, r| !r.involves(&persona_id));
        state
            .interactions
            .retain(|i| i.sender_id != persona_id && i.recipient_id != persona_id);
        state.goals.remove(&persona_id);
        tracing::debug!(persona_id = %persona_id, "Deleted persona and dependent records");
        Ok(true)
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn get_relationship(
        &self,
        persona1_id: &str,
        persona2_id: &str,
    ) -> Result<Option<Relationship>, StorageError> {
        let a = normalize_id(persona1_id, "persona1_id")?;
        let b = normalize_id(persona2_id, "persona2_id")?;
        let state = self.state.read().await;
        Ok(state
            .pair_key(&a, &b)
            .and_then(|key| state.relationships.get(&key).cloned()))
    }

    async fn list_relationships(&self) -> Result<Vec<Relationship>, StorageError> {
        let mut relationships: Vec<Relationship> =
            self.state.read().await.relationships.values().cloned().collect();
        relationships.sort_by(|a, b| {
            b.relationship_strength
                .total_cmp(&a.relationship_strength)
                .then_with(|| a.persona1_id.cmp(&b.persona1_id))
                .then_with(|| a.persona2_id.cmp(&b.persona2_id))
        });
        Ok(relationships)
    }

    async fn create_relationship(
        &self,
        relationship: Relationship,
    ) -> Result<Relationship, StorageError> {
        let relationship = relationship.normalized()?;
        let (a, b) = (
            relationship.persona1_id.clone(),
            relationship.persona2_id.clone(),
        );
        let mut state = self.state.write().await;
        state.require_persona(&a)?;
        state.require_persona(&b)?;
        if state.pair_key(&a, &b).is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "Relationship between {} and {}",
                a, b
            )));
        }
        state.relationships.insert((a, b), relationship.clone());
        Ok(relationship)
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

        let mut state = self.state.write().await;
        let key = state.resolve_pair(&a, &b, self.policy)?;
        let current = state
            .relationships
            .remove(&key)
            .ok_or_else(|| StorageError::relationship_not_found(&a, &b))?;
        let updated = apply_delta(current, delta);
        state.relationships.insert(key, updated.clone());
        Ok(updated)
    }

    fn missing_relationship_policy(&self) -> MissingRelationshipPolicy {
        self.policy
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn record_interaction(
        &self,
        interaction: NewInteraction,
    ) -> Result<RecordedInteraction, StorageError> {
        let new = interaction.normalized()?;

        let mut state = self.state.write().await;
        let key = state.resolve_pair(&new.sender_id, &new.recipient_id, self.policy)?;
        let timestamp = self.clock.tick();
        let current = state
            .relationships
            .remove(&key)
            .ok_or_else(|| StorageError::relationship_not_found(&new.sender_id, &new.recipient_id))?;
        let relationship = metrics::record_interaction_at(current, new.emotional_valence, timestamp);
        state.relationships.insert(key, relationship.clone());

        let interaction = new.into_interaction(timestamp);
        state.interactions.push_front(interaction.clone());

        Ok(RecordedInteraction {
            interaction,
            relationship,
        })
    }

    async fn list_recent_interactions(&self, count: usize) -> Result<Vec<Interaction>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .interactions
            .iter()
            .take(recent_limit(count))
            .cloned()
            .collect())
    }

    async fn count_interactions(&self) -> Result<usize, StorageError> {
        Ok(self.state.read().await.interactions.len())
    }
}

#[async_trait]
impl GoalStore for MemoryStore {
    async fn upsert_goal(&self, goal: Goal) -> Result<Goal, StorageError> {
        let mut goal = goal.normalized()?;
        let mut state = self.state.write().await;
        state.require_persona(&goal.persona_id)?;

        let owned = state.goals.entry(goal.persona_id.clone()).or_default();
        goal.updated_at = chrono::Utc::now();
        match owned.iter_mut().find(|g| g.goal_id == goal.goal_id) {
            Some(existing) => {
                goal.created_at = existing.created_at;
                *existing = goal.clone();
            }
            None => owned.push(goal.clone()),
        }
        Ok(goal)
    }

    async fn list_goals(&self, persona_id: &str) -> Result<Vec<Goal>, StorageError> {
        let persona_id = normalize_id(persona_id, "persona_id")?;
        Ok(self
            .state
            .read()
            .await
            .goals
            .get(&persona_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_active_goals(&self) -> Result<Vec<Goal>, StorageError> {
        let state = self.state.read().await;
        let mut goals: Vec<Goal> = state
            .goals
            .values()
            .flatten()
            .filter(|g| g.is_active())
            .cloned()
            .collect();
        goals.sort_by(|a, b| {
            a.persona_id
                .cmp(&b.persona_id)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(goals)
    }
}

impl GraphStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttachmentStyle;
    use std::sync::Arc;

    fn seeded() -> MemoryStore {
        MemoryStore::with_demo_data().expect("demo data seeds")
    }

    #[tokio::test]
    async fn test_relationship_lookup_is_order_independent() {
        let store = MemoryStore::new();
        for name in ["Ava", "Ben"] {
            store
                .upsert_persona(Persona::builder(name).build().unwrap())
                .await
                .unwrap();
        }
        store
            .create_relationship(Relationship::new("ava", "ben").unwrap().with_metrics(3.0, 2.0, 1.0))
            .await
            .unwrap();

        let forward = store.get_relationship("ava", "ben").await.unwrap().unwrap();
        let reverse = store.get_relationship("ben", "ava").await.unwrap().unwrap();
        assert_eq!(forward, reverse);
        assert_eq!(reverse.trust_level, 3.0);
    }

    #[tokio::test]
    async fn test_demo_update_clamps_to_zero() {
        let store = seeded();
        let lila = store.get_persona("lila").await.unwrap().unwrap();
        assert_eq!(lila.attachment_style, AttachmentStyle::Secure);

        let updated = store
            .upsert_relationship_metrics("lila", "don", MetricDelta::trust(-10.0))
            .await
            .unwrap();
        assert_eq!(updated.trust_level, 0.0);
        assert_eq!(updated.intimacy_level, 6.8);

        let reread = store.get_relationship("don", "lila").await.unwrap().unwrap();
        assert_eq!(reread.trust_level, 0.0);
    }

    #[tokio::test]
    async fn test_missing_relationship_created_by_default() {
        let store = seeded();
        store
            .upsert_persona(Persona::builder("Nova").attachment_style("avoidant").build().unwrap())
            .await
            .unwrap();

        let created = store
            .upsert_relationship_metrics("nova", "lila", MetricDelta::new(1.0, 0.0, -1.0))
            .await
            .unwrap();
        assert_eq!(created.trust_level, 6.0);
        assert_eq!(created.intimacy_level, 5.0);
        assert_eq!(created.relationship_strength, 4.0);
        assert_eq!(store.list_relationships().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_relationship_rejected_under_reject_policy() {
        let store = seeded().with_policy(MissingRelationshipPolicy::Reject);
        store
            .upsert_persona(Persona::builder("Nova").build().unwrap())
            .await
            .unwrap();
        let err = store
            .upsert_relationship_metrics("nova", "lila", MetricDelta::trust(1.0))
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::relationship_not_found("nova", "lila"));
    }

    #[tokio::test]
    async fn test_create_default_requires_known_personas() {
        let store = seeded();
        let err = store
            .upsert_relationship_metrics("ghost", "lila", MetricDelta::trust(1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recent_interactions_are_capped_and_newest_first() {
        let store = seeded();
        for i in 0..60 {
            store
                .record_interaction(NewInteraction::new("lila", "don", format!("message {i}")))
                .await
                .unwrap();
        }
        assert_eq!(store.count_interactions().await.unwrap(), 61);

        let recent = store.list_recent_interactions(500).await.unwrap();
        assert_eq!(recent.len(), 50);
        assert_eq!(recent[0].content, "message 59");
        assert!(recent.windows(2).all(|w| w[0].timestamp > w[1].timestamp));

        assert_eq!(store.list_recent_interactions(3).await.unwrap().len(), 3);
        assert!(store.list_recent_interactions(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_interaction_blends_valence() {
        let store = MemoryStore::new();
        for name in ["Ava", "Ben"] {
            store
                .upsert_persona(Persona::builder(name).build().unwrap())
                .await
                .unwrap();
        }
        let first = store
            .record_interaction(NewInteraction::new("ava", "ben", "hi").with_valence(1.0))
            .await
            .unwrap();
        assert_eq!(first.relationship.emotional_valence, 0.5);
        let second = store
            .record_interaction(NewInteraction::new("ben", "ava", "hey").with_valence(1.0))
            .await
            .unwrap();
        assert_eq!(second.relationship.emotional_valence, 0.75);
        assert_eq!(second.relationship.interaction_count, 2);
        assert!(second.interaction.interaction_id.starts_with("int_ben_ava_"));
        assert_ne!(first.interaction.interaction_id, second.interaction.interaction_id);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_serialized() {
        let store = Arc::new(seeded());
        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .upsert_relationship_metrics("lila", "don", MetricDelta::new(0.1, 0.0, 0.0))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let rel = store.get_relationship("lila", "don").await.unwrap().unwrap();
        assert!((rel.trust_level - 9.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_duplicate_names_are_rejected() {
        let store = seeded();
        let imposter = Persona::builder("Lila").id("lila2").build().unwrap();
        let err = store.upsert_persona(imposter).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_delete_persona_cascades() {
        let store = seeded();
        assert!(store.delete_persona("DON").await.unwrap());
        assert!(store.get_persona("don").await.unwrap().is_none());
        assert!(store.list_relationships().await.unwrap().is_empty());
        assert_eq!(store.count_interactions().await.unwrap(), 0);
        assert!(store.list_goals("don").await.unwrap().is_empty());
        assert_eq!(store.list_active_goals().await.unwrap().len(), 1);
        assert!(!store.delete_persona("don").await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_restores_demo_data() {
        let store = seeded();
        store.clear().await.unwrap();
        assert!(store.list_personas().await.unwrap().is_empty());
        store.reset().await.unwrap();
        let names: Vec<String> = store
            .list_personas()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Don", "Lila"]);
    }
}
