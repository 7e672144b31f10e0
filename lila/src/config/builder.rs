//! Configuration builder.

use super::{Result, models::*, validation};
use crate::relationships::MissingRelationshipPolicy;
use std::path::Path;
use std::time::Duration;

/// Builder for creating LilaConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: LilaConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: LilaConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: LilaConfig) -> Self {
        Self { config }
    }

    pub fn with_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage.backend = backend;
        self
    }

    /// Serve from the in-memory store only.
    pub fn with_memory_storage(mut self) -> Self {
        self.config.storage.backend = StorageBackend::Memory;
        self
    }

    /// Use SurrealDB's embedded in-memory engine.
    pub fn with_embedded_surrealdb(mut self) -> Self {
        self.config.storage.backend = StorageBackend::SurrealDB;
        self.config.storage.surrealdb = SurrealDBConfig::in_memory();
        self
    }

    pub fn with_surrealdb_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.storage.backend = StorageBackend::SurrealDB;
        self.config.storage.surrealdb.endpoint = endpoint.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.storage.surrealdb.namespace = namespace.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.config.storage.surrealdb.database = database.into();
        self
    }

    /// Root credentials for SurrealDB.
    pub fn with_root_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.storage.surrealdb.auth = Some(SurrealDBAuth {
            auth_type: SurrealDBAuthType::Root,
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Connection attempts and the pause between them.
    pub fn with_connect_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.config.storage.surrealdb.max_connect_attempts = attempts;
        self.config.storage.surrealdb.retry_delay = delay;
        self
    }

    pub fn with_fallback_on_unavailable(mut self, enabled: bool) -> Self {
        self.config.storage.fallback_on_unavailable = enabled;
        self
    }

    pub fn with_seed_demo_data(mut self, enabled: bool) -> Self {
        self.config.storage.seed_demo_data = enabled;
        self
    }

    /// Override the backend's default handling of unrelated pairs.
    pub fn with_missing_relationship_policy(mut self, policy: MissingRelationshipPolicy) -> Self {
        self.config.storage.missing_relationship = Some(policy);
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// In-memory store seeded with the demo personas, debug logging.
    pub fn development() -> Self {
        Self::new()
            .with_memory_storage()
            .with_seed_demo_data(true)
            .with_log_level(LogLevel::Debug)
    }

    /// Like [`ConfigBuilder::development`] with quieter logs.
    pub fn testing() -> Self {
        Self::development().with_log_level(LogLevel::Warn)
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<LilaConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
