//! Configuration structures for storage backends

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::relationships::MissingRelationshipPolicy;

/// Which store the graph is served from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SurrealDB, embedded or remote
    #[default]
    SurrealDB,
    /// The in-memory fallback store
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::SurrealDB => write!(f, "surrealdb"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "surrealdb" | "surreal" | "graph" => Ok(StorageBackend::SurrealDB),
            "memory" | "mem" | "fallback" => Ok(StorageBackend::Memory),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend requested at startup
    pub backend: StorageBackend,

    /// SurrealDB connection settings
    pub surrealdb: SurrealDBConfig,

    /// Serve from the in-memory store when SurrealDB cannot be reached
    /// instead of failing startup
    pub fallback_on_unavailable: bool,

    /// Seed the in-memory store with the demo personas
    pub seed_demo_data: bool,

    /// Override the backend's default handling of mutations on unrelated
    /// pairs
    pub missing_relationship: Option<MissingRelationshipPolicy>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            surrealdb: SurrealDBConfig::default(),
            fallback_on_unavailable: true,
            seed_demo_data: true,
            missing_relationship: None,
        }
    }
}

/// SurrealDB configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurrealDBConfig {
    /// Endpoint URL: `ws://`, `wss://`, `http://`, `https://`, `mem://` or
    /// `rocksdb://path`
    pub endpoint: String,

    /// Namespace
    pub namespace: String,

    /// Database name
    pub database: String,

    /// Authentication information
    pub auth: Option<SurrealDBAuth>,

    /// Connection attempts before giving up
    pub max_connect_attempts: u32,

    /// Pause between connection attempts
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
}

impl Default for SurrealDBConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8000".to_string(),
            namespace: "lila".to_string(),
            database: "relationships".to_string(),
            auth: None,
            max_connect_attempts: 30,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl SurrealDBConfig {
    /// Embedded in-memory engine, used by tests and development
    pub fn in_memory() -> Self {
        Self {
            endpoint: "mem://".to_string(),
            max_connect_attempts: 1,
            retry_delay: Duration::from_millis(0),
            ..Self::default()
        }
    }

    /// Whether the endpoint refers to an embedded engine
    pub fn is_embedded(&self) -> bool {
        self.endpoint.starts_with("mem://") || self.endpoint.starts_with("rocksdb://")
    }
}

/// SurrealDB authentication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurrealDBAuth {
    /// Authentication type
    #[serde(default)]
    pub auth_type: SurrealDBAuthType,

    pub username: String,

    pub password: String,
}

/// SurrealDB authentication types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SurrealDBAuthType {
    /// Root user authentication
    #[default]
    Root,
    /// Namespace user authentication
    Namespace,
    /// Database user authentication
    Database,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_surrealdb_with_fallback() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::SurrealDB);
        assert_eq!(config.surrealdb.max_connect_attempts, 30);
        assert_eq!(config.surrealdb.retry_delay, Duration::from_secs(2));
        assert!(config.fallback_on_unavailable);
        assert!(config.missing_relationship.is_none());
    }

    #[test]
    fn retry_delay_uses_humantime() {
        let config: SurrealDBConfig =
            serde_json::from_value(serde_json::json!({ "retry_delay": "500ms" })).unwrap();
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.namespace, "lila");
    }

    #[test]
    fn backend_parses_aliases() {
        assert_eq!("fallback".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("SurrealDB".parse::<StorageBackend>().unwrap(), StorageBackend::SurrealDB);
        assert!("neo4j".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn in_memory_is_embedded() {
        assert!(SurrealDBConfig::in_memory().is_embedded());
        assert!(!SurrealDBConfig::default().is_embedded());
    }
}
