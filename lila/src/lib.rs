//! # Lila
//!
//! Persona relationship graph with psychological metrics. Personas carry an
//! attachment style and a five-factor personality profile; relationships
//! between them carry trust, intimacy and strength on a 0–10 scale and an
//! emotional valence blended from recorded interactions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lila::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::development().build()?;
//!     let handle = lila::init(config).await?;
//!
//!     let store = handle.store().await;
//!     let updated = store
//!         .upsert_relationship_metrics("lila", "don", MetricDelta::trust(0.5))
//!         .await?;
//!     println!("trust is now {}", updated.trust_level);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **models**: personas, relationships, interactions and goals
//! - **relationships**: the clamped metric algebra and valence blending
//! - **analysis**: attachment compatibility, strategy selection, goal progress
//! - **storage**: the `GraphStore` trait family with a SurrealDB backend and
//!   an in-memory fallback behind a `StoreHandle`

pub mod analysis;
pub mod config;
pub mod logging;
pub mod models;
pub mod relationships;
pub mod storage;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::{init, init_with_defaults};

    pub use crate::config::{ConfigBuilder, ConfigLoader, LilaConfig, LogFormat, LogLevel};

    pub use crate::models::{
        AttachmentStyle, Goal, GoalPriority, GoalStatus, Interaction, NewInteraction, Persona,
        PersonalityProfile, RecordedInteraction, Relationship,
    };

    pub use crate::relationships::{MetricDelta, MissingRelationshipPolicy};

    pub use crate::analysis::{CompatibilityLevel, InteractionStrategy};

    pub use crate::storage::{
        GoalStore, GraphStore, InteractionStore, PersonaStore, RelationshipStore, StorageConfig,
        StorageError, StoreHandle, StoreMode,
    };

    pub use crate::{LilaError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for Lila operations
#[derive(Debug, thiserror::Error)]
pub enum LilaError {
    /// The graph store could not be reached
    #[error("Graph store unavailable: {0}")]
    StoreUnavailable(String),

    /// A referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// The two personas have no relationship
    #[error("No relationship found between {persona1_id} and {persona2_id}")]
    RelationshipNotFound {
        persona1_id: String,
        persona2_id: String,
    },

    /// Unusable input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A unique record already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Any other storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),
}

impl From<storage::StorageError> for LilaError {
    fn from(err: storage::StorageError) -> Self {
        use storage::StorageError;
        match err {
            StorageError::Connection(msg) => LilaError::StoreUnavailable(msg),
            StorageError::NotFound(msg) => LilaError::NotFound(msg),
            StorageError::RelationshipNotFound {
                persona1_id,
                persona2_id,
            } => LilaError::RelationshipNotFound {
                persona1_id,
                persona2_id,
            },
            StorageError::Validation(msg) => LilaError::Validation(msg),
            StorageError::AlreadyExists(msg) => LilaError::AlreadyExists(msg),
            StorageError::Configuration(msg) => LilaError::Configuration(msg),
            other => LilaError::Storage(other.to_string()),
        }
    }
}

impl From<crate::config::ConfigError> for LilaError {
    fn from(err: crate::config::ConfigError) -> Self {
        LilaError::Configuration(err.to_string())
    }
}

impl From<models::ValidationError> for LilaError {
    fn from(err: models::ValidationError) -> Self {
        LilaError::Validation(err.0)
    }
}

/// Result type for Lila operations
pub type Result<T> = std::result::Result<T, LilaError>;

/// Initialize with layered configuration: defaults, default files and
/// environment variables.
pub async fn init_with_defaults() -> Result<storage::StoreHandle> {
    let config = config::ConfigLoader::layered(None)?.extract()?;
    init(config).await
}

/// Open the configured store.
///
/// Logging is left to the caller, which must keep the file writer's guard
/// alive. Fails with [`LilaError::StoreUnavailable`] only when SurrealDB is
/// unreachable and `fallback_on_unavailable` is off.
pub async fn init(config: config::LilaConfig) -> Result<storage::StoreHandle> {
    use storage::GraphStore;

    let handle = storage::create_store(&config.storage).await?;
    tracing::info!(
        store_mode = %handle.mode().await,
        backend = handle.store().await.backend_name(),
        "Lila store ready"
    );
    Ok(handle)
}
