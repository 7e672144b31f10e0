//! Schema initialization for the SurrealDB store

use crate::storage::errors::StorageError;
use surrealdb::{Connection, Surreal};

/// Personas are graph nodes, relationships are edges between them, and
/// interactions and goals are plain tables that reference personas by id.
const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS persona SCHEMALESS
        COMMENT "Personas with their psychological profile";
    DEFINE INDEX IF NOT EXISTS persona_id_idx ON TABLE persona FIELDS persona_id UNIQUE;
    DEFINE INDEX IF NOT EXISTS persona_name_idx ON TABLE persona FIELDS name UNIQUE;
    DEFINE INDEX IF NOT EXISTS persona_attachment_idx ON TABLE persona FIELDS attachment_style;

    DEFINE TABLE IF NOT EXISTS relationship TYPE RELATION IN persona OUT persona SCHEMALESS
        COMMENT "Relationship metrics, read symmetrically";
    DEFINE INDEX IF NOT EXISTS relationship_pair_idx ON TABLE relationship
        FIELDS persona1_id, persona2_id UNIQUE;
    DEFINE INDEX IF NOT EXISTS relationship_strength_idx ON TABLE relationship
        FIELDS relationship_strength;

    DEFINE TABLE IF NOT EXISTS interaction SCHEMALESS
        COMMENT "Immutable interaction log";
    DEFINE INDEX IF NOT EXISTS interaction_time_idx ON TABLE interaction FIELDS timestamp_ms;

    DEFINE TABLE IF NOT EXISTS goal SCHEMALESS
        COMMENT "Goals owned by a single persona";
    DEFINE INDEX IF NOT EXISTS goal_owner_idx ON TABLE goal FIELDS persona_id;
"#;

/// Define tables and indexes. Safe to run against an initialized database.
pub async fn initialize_schema<C>(client: &Surreal<C>) -> Result<(), StorageError>
where
    C: Connection,
{
    client
        .query(SCHEMA)
        .await
        .map_err(|e| StorageError::Query(format!("Failed to define schema: {}", e)))?
        .check()
        .map_err(|e| StorageError::Query(format!("Schema definition rejected: {}", e)))?;

    tracing::debug!("SurrealDB schema initialized");
    Ok(())
}
