//! Configuration system for Lila.
//!
//! Configuration is layered: defaults, then a configuration file, then
//! `LILA_` environment variables, then the `SURREALDB_*` connection
//! shortcuts. Every layer is optional.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;
pub mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "lila.toml",
    "lila.yaml",
    "lila.yml",
    "lila.json",
    ".lila/config.toml",
    ".lila/config.yaml",
    ".lila/config.yml",
    ".lila/config.json",
];

/// Environment variable prefix for Lila configuration
pub const ENV_PREFIX: &str = "LILA_";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
