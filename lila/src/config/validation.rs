//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &LilaConfig) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    // The connection settings are checked even for the memory backend so a
    // bad file fails at load time, not on the first switch to SurrealDB.
    let surrealdb = &config.surrealdb;

    if surrealdb.namespace.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "SurrealDB namespace cannot be empty".to_string(),
        ));
    }
    if surrealdb.database.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "SurrealDB database cannot be empty".to_string(),
        ));
    }
    if surrealdb.max_connect_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "SurrealDB max_connect_attempts must be at least 1".to_string(),
        ));
    }
    match surrealdb.endpoint.split_once("://") {
        Some((scheme, _)) if !scheme.is_empty() => {}
        _ => {
            return Err(ConfigError::ValidationError(format!(
                "SurrealDB endpoint must include a scheme such as ws:// or mem://, got '{}'",
                surrealdb.endpoint
            )));
        }
    }

    if let Some(auth) = &surrealdb.auth {
        if auth.username.is_empty() {
            return Err(ConfigError::ValidationError(
                "SurrealDB username cannot be empty when auth is configured".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if let Some(file) = &config.file {
        if file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Log file path cannot be empty".to_string(),
            ));
        }
    }
    if !config.stdout && config.file.is_none() {
        return Err(ConfigError::ValidationError(
            "Logging needs stdout or a log file".to_string(),
        ));
    }
    Ok(())
}
