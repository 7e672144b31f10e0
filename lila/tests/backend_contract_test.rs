//! Runs the same scenarios against the in-memory store and the SurrealDB
//! store (embedded `mem://` engine). Both must observe identical results.

use lila::models::{Goal, GoalStatus, NewInteraction, Persona, Relationship};
use lila::relationships::{MetricDelta, MissingRelationshipPolicy};
use lila::storage::{
    GoalStore, GraphStore, InteractionStore, MemoryStore, PersonaStore, RelationshipStore,
    StorageError, SurrealDBConfig, surreal,
};

async fn surreal_store(policy: MissingRelationshipPolicy) -> anyhow::Result<Box<dyn GraphStore>> {
    let store = surreal::connect(&SurrealDBConfig::in_memory(), policy).await?;
    Ok(Box::new(store))
}

fn memory_store(policy: MissingRelationshipPolicy) -> Box<dyn GraphStore> {
    Box::new(MemoryStore::new().with_policy(policy))
}

async fn both(policy: MissingRelationshipPolicy) -> anyhow::Result<Vec<Box<dyn GraphStore>>> {
    Ok(vec![memory_store(policy), surreal_store(policy).await?])
}

async fn add_trio(store: &dyn GraphStore) -> anyhow::Result<()> {
    for (name, style) in [("Ava", "secure"), ("Ben", "anxious"), ("Cy", "avoidant")] {
        store
            .upsert_persona(Persona::builder(name).attachment_style(style).build()?)
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_persona_round_trip_and_ordering() -> anyhow::Result<()> {
    for store in both(MissingRelationshipPolicy::Reject).await? {
        add_trio(store.as_ref()).await?;
        let backend = store.backend_name();

        let names: Vec<String> = store
            .list_personas()
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Ava", "Ben", "Cy"], "{backend}");

        let ben = store.get_persona("BEN").await?.expect("ben exists");
        assert_eq!(ben.attachment_style.as_str(), "anxious", "{backend}");
        assert_eq!(ben.personality.openness, 0.5, "{backend}");
        assert_eq!(ben.trust_level, 0.5, "{backend}");

        let clash = Persona::builder("Ava").id("ava2").build()?;
        let err = store.upsert_persona(clash).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)), "{backend}: {err}");

        // Re-upserting under the same id keeps the name
        let renamed = Persona::builder("Ava").id("ava").role("Mentor").build()?;
        let stored = store.upsert_persona(renamed).await?;
        assert_eq!(stored.role, "Mentor", "{backend}");
        assert_eq!(store.list_personas().await?.len(), 3, "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_relationship_metrics_are_clamped_and_symmetric() -> anyhow::Result<()> {
    for store in both(MissingRelationshipPolicy::Reject).await? {
        add_trio(store.as_ref()).await?;
        let backend = store.backend_name();

        store
            .create_relationship(
                Relationship::new("ava", "ben")?
                    .with_metrics(3.0, 2.0, 1.0)
                    .with_type("friend"),
            )
            .await?;

        let duplicate = store
            .create_relationship(Relationship::new("ben", "ava")?)
            .await
            .unwrap_err();
        assert!(matches!(duplicate, StorageError::AlreadyExists(_)), "{backend}");

        let forward = store.get_relationship("ava", "ben").await?.expect("related");
        let reverse = store.get_relationship("ben", "ava").await?.expect("related");
        assert_eq!(forward.trust_level, reverse.trust_level, "{backend}");
        assert_eq!(reverse.relationship_type, "friend", "{backend}");

        let updated = store
            .upsert_relationship_metrics("ben", "ava", MetricDelta::new(-10.0, 20.0, 0.5))
            .await?;
        assert_eq!(updated.trust_level, 0.0, "{backend}");
        assert_eq!(updated.intimacy_level, 10.0, "{backend}");
        assert_eq!(updated.relationship_strength, 1.5, "{backend}");

        let reread = store.get_relationship("ava", "ben").await?.expect("related");
        assert_eq!(reread.trust_level, 0.0, "{backend}");
        assert_eq!(reread.persona1_id, "ava", "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_non_finite_delta_leaves_relationship_unchanged() -> anyhow::Result<()> {
    for store in both(MissingRelationshipPolicy::Reject).await? {
        add_trio(store.as_ref()).await?;
        let backend = store.backend_name();
        store
            .create_relationship(Relationship::new("ava", "ben")?.with_metrics(4.0, 5.0, 6.0))
            .await?;

        for delta in [
            MetricDelta::trust(f64::INFINITY),
            MetricDelta::new(1.0, f64::NEG_INFINITY, 0.0),
            MetricDelta::new(0.0, 0.0, f64::NAN),
        ] {
            let err = store
                .upsert_relationship_metrics("ava", "ben", delta)
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::Validation(_)), "{backend}: {err}");
        }

        let rel = store.get_relationship("ava", "ben").await?.expect("related");
        assert_eq!(rel.trust_level, 4.0, "{backend}");
        assert_eq!(rel.intimacy_level, 5.0, "{backend}");
        assert_eq!(rel.relationship_strength, 6.0, "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_reject_policy_reports_missing_relationship() -> anyhow::Result<()> {
    for store in both(MissingRelationshipPolicy::Reject).await? {
        add_trio(store.as_ref()).await?;
        let err = store
            .upsert_relationship_metrics("ava", "cy", MetricDelta::trust(1.0))
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::relationship_not_found("ava", "cy"));

        let err = store
            .record_interaction(NewInteraction::new("ava", "cy", "hello"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No relationship found between ava and cy");
        assert_eq!(store.count_interactions().await?, 0);
    }
    Ok(())
}

#[tokio::test]
async fn test_create_default_policy_creates_neutral_relationship() -> anyhow::Result<()> {
    for store in both(MissingRelationshipPolicy::CreateDefault).await? {
        add_trio(store.as_ref()).await?;
        let backend = store.backend_name();

        let created = store
            .upsert_relationship_metrics("cy", "ava", MetricDelta::new(1.0, 0.0, -1.0))
            .await?;
        assert_eq!(created.trust_level, 6.0, "{backend}");
        assert_eq!(created.intimacy_level, 5.0, "{backend}");
        assert_eq!(created.relationship_strength, 4.0, "{backend}");
        assert_eq!(created.relationship_type, "unknown", "{backend}");

        let err = store
            .upsert_relationship_metrics("ghost", "ava", MetricDelta::trust(1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)), "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_interactions_blend_valence_and_list_newest_first() -> anyhow::Result<()> {
    for store in both(MissingRelationshipPolicy::Reject).await? {
        add_trio(store.as_ref()).await?;
        let backend = store.backend_name();
        store
            .create_relationship(Relationship::new("ava", "ben")?)
            .await?;

        let first = store
            .record_interaction(NewInteraction::new("ava", "ben", "hi").with_valence(1.0))
            .await?;
        assert_eq!(first.relationship.emotional_valence, 0.5, "{backend}");
        assert_eq!(first.relationship.interaction_count, 1, "{backend}");

        let second = store
            .record_interaction(
                NewInteraction::new("ben", "ava", "hello again")
                    .with_valence(1.0)
                    .with_impact(0.2),
            )
            .await?;
        assert_eq!(second.relationship.emotional_valence, 0.75, "{backend}");
        assert_eq!(second.relationship.interaction_count, 2, "{backend}");
        assert!(second.relationship.last_interaction.is_some(), "{backend}");

        let recent = store.list_recent_interactions(10).await?;
        assert_eq!(recent.len(), 2, "{backend}");
        assert_eq!(recent[0].content, "hello again", "{backend}");
        assert_eq!(recent[0].interaction_id, second.interaction.interaction_id, "{backend}");
        assert_eq!(store.list_recent_interactions(1).await?.len(), 1, "{backend}");
        assert!(store.list_recent_interactions(0).await?.is_empty(), "{backend}");
        assert_eq!(store.count_interactions().await?, 2, "{backend}");
    }
    Ok(())
}

#[tokio::test]
async fn test_relationships_list_strongest_first() -> anyhow::Result<()> {
    for store in both(MissingRelationshipPolicy::Reject).await? {
        add_trio(store.as_ref()).await?;
        store
            .create_relationship(Relationship::new("ava", "ben")?.with_metrics(5.0, 5.0, 2.0))
            .await?;
        store
            .create_relationship(Relationship::new("ben", "cy")?.with_metrics(5.0, 5.0, 9.0))
            .await?;

        let strengths: Vec<f64> = store
            .list_relationships()
            .await?
            .into_iter()
            .map(|r| r.relationship_strength)
            .collect();
        assert_eq!(strengths, vec![9.0, 2.0], "{}", store.backend_name());
    }
    Ok(())
}

#[tokio::test]
async fn test_goals_and_cascading_delete() -> anyhow::Result<()> {
    for store in both(MissingRelationshipPolicy::Reject).await? {
        add_trio(store.as_ref()).await?;
        let backend = store.backend_name();
        store
            .create_relationship(Relationship::new("ava", "ben")?)
            .await?;
        store
            .record_interaction(NewInteraction::new("ava", "ben", "hi"))
            .await?;

        store
            .upsert_goal(
                Goal::new("ben", "trust", "Open up about vulnerabilities")
                    .with_id("goal_ben")
                    .with_progress(0.4),
            )
            .await?;
        store
            .upsert_goal(
                Goal::new("ava", "emotional", "Stay present")
                    .with_id("goal_ava_done")
                    .with_status(GoalStatus::Completed),
            )
            .await?;

        let orphan = store
            .upsert_goal(Goal::new("ghost", "trust", "Haunt"))
            .await
            .unwrap_err();
        assert!(matches!(orphan, StorageError::NotFound(_)), "{backend}");

        let active = store.list_active_goals().await?;
        assert_eq!(active.len(), 1, "{backend}");
        assert_eq!(active[0].goal_id, "goal_ben", "{backend}");
        assert_eq!(store.list_goals("ava").await?.len(), 1, "{backend}");

        assert!(store.delete_persona("ben").await?, "{backend}");
        assert!(store.get_persona("ben").await?.is_none(), "{backend}");
        assert!(store.list_relationships().await?.is_empty(), "{backend}");
        assert_eq!(store.count_interactions().await?, 0, "{backend}");
        assert!(store.list_active_goals().await?.is_empty(), "{backend}");
        assert!(!store.delete_persona("ben").await?, "{backend}");
    }
    Ok(())
}
