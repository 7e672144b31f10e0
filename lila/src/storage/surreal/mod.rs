//! SurrealDB-backed graph store
//!
//! Personas are nodes, relationships are `persona->relationship->persona`
//! edges. The endpoint scheme picks the engine: `mem://` and `rocksdb://`
//! run embedded, `ws://` and `http://` talk to a server.

pub mod base;
pub mod goal;
pub mod interaction;
pub mod persona;
pub mod relationship;
pub mod schema;

pub use base::SurrealStore;

use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use crate::relationships::MissingRelationshipPolicy;
use crate::storage::config::{SurrealDBAuth, SurrealDBAuthType, SurrealDBConfig};
use crate::storage::errors::StorageError;

/// Store over whichever engine the endpoint selected
pub type AnySurrealStore = SurrealStore<Any>;

/// Connect once, authenticate and initialize the schema.
pub async fn connect(
    config: &SurrealDBConfig,
    policy: MissingRelationshipPolicy,
) -> Result<AnySurrealStore, StorageError> {
    tracing::info!(endpoint = %config.endpoint, "Connecting to SurrealDB");

    let client = surrealdb::engine::any::connect(config.endpoint.as_str())
        .await
        .map_err(|e| {
            StorageError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
        })?;

    if let Some(auth) = &config.auth {
        authenticate_client(&client, auth, config).await?;
    }

    SurrealStore::new(client, &config.namespace, &config.database, policy).await
}

/// Connect, retrying up to `max_connect_attempts` times with
/// `retry_delay` between attempts.
pub async fn connect_with_retry(
    config: &SurrealDBConfig,
    policy: MissingRelationshipPolicy,
) -> Result<AnySurrealStore, StorageError> {
    let attempts = config.max_connect_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match connect(config, policy).await {
            Ok(store) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Connected to SurrealDB after retrying");
                }
                return Ok(store);
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "SurrealDB connection attempt failed"
                );
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        }
    }

    Err(StorageError::Connection(format!(
        "Failed to connect to SurrealDB at {} after {} attempts: {}",
        config.endpoint,
        attempts,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Sign in at the level the credentials were issued for.
pub async fn authenticate_client<C>(
    client: &Surreal<C>,
    auth: &SurrealDBAuth,
    config: &SurrealDBConfig,
) -> Result<(), StorageError>
where
    C: surrealdb::Connection,
{
    let result = match auth.auth_type {
        SurrealDBAuthType::Root => {
            tracing::debug!("Authenticating as root user");
            client
                .signin(surrealdb::opt::auth::Root {
                    username: auth.username.as_str(),
                    password: auth.password.as_str(),
                })
                .await
                .map(|_| ())
        }
        SurrealDBAuthType::Namespace => {
            tracing::debug!("Authenticating as namespace user");
            client
                .signin(surrealdb::opt::auth::Namespace {
                    namespace: config.namespace.as_str(),
                    username: auth.username.as_str(),
                    password: auth.password.as_str(),
                })
                .await
                .map(|_| ())
        }
        SurrealDBAuthType::Database => {
            tracing::debug!("Authenticating as database user");
            client
                .signin(surrealdb::opt::auth::Database {
                    namespace: config.namespace.as_str(),
                    database: config.database.as_str(),
                    username: auth.username.as_str(),
                    password: auth.password.as_str(),
                })
                .await
                .map(|_| ())
        }
    };

    result.map_err(|e| {
        StorageError::Connection(format!("{:?} authentication failed: {}", auth.auth_type, e))
    })
}
