//! Server configuration module

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use lila::config::{LilaConfig, StorageBackend};

use crate::cli::CliArgs;
use crate::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Explicit library config file, layered over the default files
    pub config_file: Option<PathBuf>,

    /// Serve from the in-memory store regardless of the library config
    pub force_fallback: bool,

    /// Log level override from the command line
    pub log_level: Option<String>,

    /// Log format override from the command line
    pub log_format: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8765,
            config_file: None,
            force_fallback: false,
            log_level: None,
            log_format: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from CLI arguments and environment variables
    /// CLI arguments take precedence over environment variables
    pub fn from_cli_and_env(cli_args: &CliArgs) -> ServerResult<Self> {
        Self::from_cli_and_lookup(cli_args, |key| env::var(key).ok())
    }

    fn from_cli_and_lookup<F>(cli_args: &CliArgs, lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = &cli_args.host {
            config.host = host.clone();
        } else if let Some(host) = lookup("LILA_HOST") {
            config.host = host;
        }

        if let Some(port) = cli_args.port {
            config.port = port;
        } else if let Some(port) = lookup("LILA_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ServerError::Config(format!("Invalid LILA_PORT '{}': {}", port, e)))?;
        }

        config.config_file = cli_args
            .config_file
            .clone()
            .or_else(|| lookup("LILA_CONFIG_FILE").map(PathBuf::from));

        config.force_fallback = cli_args.memory;
        config.log_level = cli_args.log_level.clone();
        config.log_format = cli_args.log_format.clone();

        Ok(config)
    }

    /// Apply command line overrides to the loaded library configuration
    pub fn apply_to(&self, lila_config: &mut LilaConfig) -> ServerResult<()> {
        if let Some(level) = &self.log_level {
            lila_config.logging.level = level.parse().map_err(ServerError::Config)?;
        }
        if let Some(format) = &self.log_format {
            lila_config.logging.format = format.parse().map_err(ServerError::Config)?;
        }
        if self.force_fallback {
            lila_config.storage.backend = StorageBackend::Memory;
        }
        Ok(())
    }
}
