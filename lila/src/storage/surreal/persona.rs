//! Persona nodes in SurrealDB

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use surrealdb::Connection;

use super::base::SurrealStore;
use crate::models::{AttachmentStyle, Persona, PersonalityProfile, normalize_id};
use crate::storage::errors::StorageError;
use crate::storage::traits::PersonaStore;

/// Flat node layout: personality traits live next to the identity fields so
/// they can be indexed and filtered individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PersonaRecord {
    persona_id: String,
    name: String,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    attachment_style: Option<String>,
    #[serde(default)]
    openness: Option<f64>,
    #[serde(default)]
    conscientiousness: Option<f64>,
    #[serde(default)]
    extraversion: Option<f64>,
    #[serde(default)]
    agreeableness: Option<f64>,
    #[serde(default)]
    neuroticism: Option<f64>,
    #[serde(default)]
    trust_level: Option<f64>,
    #[serde(default)]
    communication_style: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<&Persona> for PersonaRecord {
    fn from(persona: &Persona) -> Self {
        let traits = &persona.personality;
        Self {
            persona_id: persona.persona_id.clone(),
            name: persona.name.clone(),
            age: persona.age,
            role: Some(persona.role.clone()),
            description: Some(persona.description.clone()),
            attachment_style: Some(persona.attachment_style.as_str().to_string()),
            openness: Some(traits.openness),
            conscientiousness: Some(traits.conscientiousness),
            extraversion: Some(traits.extraversion),
            agreeableness: Some(traits.agreeableness),
            neuroticism: Some(traits.neuroticism),
            trust_level: Some(persona.trust_level),
            communication_style: persona.communication_style.clone(),
            created_at: Some(persona.created_at),
            updated_at: Some(persona.updated_at),
        }
    }
}

impl From<PersonaRecord> for Persona {
    fn from(record: PersonaRecord) -> Self {
        let now = Utc::now();
        let created_at = record.created_at.unwrap_or(now);
        Persona {
            persona_id: record.persona_id,
            name: record.name,
            age: record.age,
            role: record.role.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            attachment_style: record
                .attachment_style
                .as_deref()
                .map(AttachmentStyle::parse_lenient)
                .unwrap_or_default(),
            personality: PersonalityProfile::from_optional(
                record.openness,
                record.conscientiousness,
                record.extraversion,
                record.agreeableness,
                record.neuroticism,
            ),
            trust_level: record
                .trust_level
                .map(|t| t.clamp(0.0, 1.0))
                .unwrap_or(crate::models::NEUTRAL_TRAIT),
            communication_style: record.communication_style,
            created_at,
            updated_at: record.updated_at.unwrap_or(created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PersonaIdRow {
    persona_id: String,
}

impl<C> SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    pub(crate) async fn fetch_persona(&self, persona_id: &str) -> Result<Option<Persona>, StorageError> {
        let mut response = self
            .client
            .query("SELECT * FROM type::thing('persona', $persona_id)")
            .bind(("persona_id", persona_id.to_string()))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to get persona: {}", e)))?;

        let records: Vec<PersonaRecord> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to read persona: {}", e)))?;

        Ok(records.into_iter().next().map(Persona::from))
    }

    pub(crate) async fn require_persona(&self, persona_id: &str) -> Result<Persona, StorageError> {
        self.fetch_persona(persona_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("Persona {} not found", persona_id)))
    }
}

#[async_trait]
impl<C> PersonaStore for SurrealStore<C>
where
    C: Connection + Clone + Send + Sync + Debug + 'static,
{
    async fn get_persona(&self, persona_id: &str) -> Result<Option<Persona>, StorageError> {
        let persona_id = normalize_id(persona_id, "persona_id")?;
        self.fetch_persona(&persona_id).await
    }

    async fn list_personas(&self) -> Result<Vec<Persona>, StorageError> {
        let mut response = self
            .client
            .query("SELECT * FROM persona ORDER BY name ASC")
            .await
            .map_err(|e| StorageError::Query(format!("Failed to list personas: {}", e)))?;

        let records: Vec<PersonaRecord> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to read personas: {}", e)))?;

        Ok(records.into_iter().map(Persona::from).collect())
    }

    async fn upsert_persona(&self, persona: Persona) -> Result<Persona, StorageError> {
        let mut persona = persona.normalized()?;
        let _guard = self.write_lock.lock().await;

        let mut response = self
            .client
            .query("SELECT persona_id FROM persona WHERE name = $name AND persona_id != $persona_id")
            .bind(("name", persona.name.clone()))
            .bind(("persona_id", persona.persona_id.clone()))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to check persona name: {}", e)))?;
        let clashes: Vec<PersonaIdRow> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to check persona name: {}", e)))?;
        if let Some(clash) = clashes.first() {
            return Err(StorageError::AlreadyExists(format!(
                "Persona name {} is already used by {}",
                persona.name, clash.persona_id
            )));
        }

        if let Some(existing) = self.fetch_persona(&persona.persona_id).await? {
            persona.created_at = existing.created_at;
        }
        persona.updated_at = Utc::now();

        let mut response = self
            .client
            .query("UPSERT type::thing('persona', $persona_id) CONTENT $content")
            .bind(("persona_id", persona.persona_id.clone()))
            .bind(("content", PersonaRecord::from(&persona)))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to store persona: {}", e)))?;
        let stored: Vec<PersonaRecord> = response
            .take(0)
            .map_err(|e| StorageError::Query(format!("Failed to store persona: {}", e)))?;

        stored
            .into_iter()
            .next()
            .map(Persona::from)
            .ok_or_else(|| StorageError::Internal("Persona upsert returned no record".to_string()))
    }

    async fn delete_persona(&self, persona_id: &str) -> Result<bool, StorageError> {
        let persona_id = normalize_id(persona_id, "persona_id")?;
        let _guard = self.write_lock.lock().await;

        if self.fetch_persona(&persona_id).await?.is_none() {
            return Ok(false);
        }

        self.client
            .query(
                r#"
                DELETE relationship WHERE persona1_id = $persona_id OR persona2_id = $persona_id;
                DELETE interaction WHERE sender_id = $persona_id OR recipient_id = $persona_id;
                DELETE goal WHERE persona_id = $persona_id;
                DELETE type::thing('persona', $persona_id);
                "#,
            )
            .bind(("persona_id", persona_id.clone()))
            .await
            .map_err(|e| StorageError::Query(format!("Failed to delete persona: {}", e)))?
            .check()
            .map_err(|e| StorageError::Query(format!("Failed to delete persona: {}", e)))?;

        tracing::debug!(persona_id = %persona_id, "Deleted persona and dependent records");
        Ok(true)
    }
}
