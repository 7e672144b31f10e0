//! Configuration loader.

use super::{ConfigError, DEFAULT_CONFIG_FILES, ENV_PREFIX, ENV_SEPARATOR, Result, models::*, validation};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};

/// Configuration loader that handles loading from multiple sources.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    /// Create a new configuration loader with default values.
    pub fn new() -> Self {
        let figment = Figment::new().merge(Serialized::defaults(LilaConfig::default()));
        Self { figment }
    }

    /// Defaults, default files, environment and the SurrealDB shortcuts, in
    /// that order. An explicit file is merged after the default files.
    pub fn layered(explicit_file: Option<&Path>) -> Result<Self> {
        let mut loader = Self::new();
        loader.load_default_files();
        if let Some(path) = explicit_file {
            loader.load_file(path)?;
        }
        loader.load_env().load_surrealdb_env();
        Ok(loader)
    }

    /// Load configuration from a file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileLoadError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let figment = std::mem::take(&mut self.figment);
        self.figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => figment.merge(Toml::file(path)),
            Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => {
                self.figment = figment;
                return Err(ConfigError::FileLoadError(format!(
                    "Unsupported file format: {}",
                    path.display()
                )));
            }
        };

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(self)
    }

    /// Merge the first default file found in the working directory, then the
    /// first one found in the platform config directory.
    pub fn load_default_files(&mut self) -> &mut Self {
        for file in DEFAULT_CONFIG_FILES {
            let path = PathBuf::from(file);
            if path.exists() && self.load_file(&path).is_ok() {
                break;
            }
        }

        if let Some(proj_dirs) = directories::ProjectDirs::from("org", "lila", "lila") {
            let config_dir = proj_dirs.config_dir();

            for ext in ["toml", "yaml", "yml", "json"] {
                let path = config_dir.join(format!("config.{}", ext));
                if path.exists() && self.load_file(&path).is_ok() {
                    break;
                }
            }
        }

        self
    }

    /// Merge `LILA_` variables; nested keys are separated by `__`, as in
    /// `LILA_STORAGE__SURREALDB__ENDPOINT`.
    pub fn load_env(&mut self) -> &mut Self {
        let figment = std::mem::take(&mut self.figment)
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR));
        self.figment = figment;
        self
    }

    /// Merge the conventional `SURREALDB_URL`, `SURREALDB_NAMESPACE`,
    /// `SURREALDB_DATABASE`, `SURREALDB_USERNAME` and `SURREALDB_PASSWORD`
    /// variables. Setting the URL also selects the SurrealDB backend.
    pub fn load_surrealdb_env(&mut self) -> &mut Self {
        let mut figment = std::mem::take(&mut self.figment);

        if let Ok(url) = std::env::var("SURREALDB_URL") {
            tracing::info!(endpoint = %url, "Using SurrealDB endpoint from SURREALDB_URL");
            figment = figment
                .merge(("storage.surrealdb.endpoint", url))
                .merge(("storage.backend", StorageBackend::SurrealDB));
        }
        if let Ok(namespace) = std::env::var("SURREALDB_NAMESPACE") {
            figment = figment.merge(("storage.surrealdb.namespace", namespace));
        }
        if let Ok(database) = std::env::var("SURREALDB_DATABASE") {
            figment = figment.merge(("storage.surrealdb.database", database));
        }
        if let (Ok(username), Ok(password)) = (
            std::env::var("SURREALDB_USERNAME"),
            std::env::var("SURREALDB_PASSWORD"),
        ) {
            figment = figment.merge((
                "storage.surrealdb.auth",
                SurrealDBAuth {
                    auth_type: SurrealDBAuthType::Root,
                    username,
                    password,
                },
            ));
        }

        self.figment = figment;
        self
    }

    /// Load configuration from a custom source.
    pub fn merge<T: figment::Provider>(&mut self, provider: T) -> &mut Self {
        let figment = std::mem::take(&mut self.figment).merge(provider);
        self.figment = figment;
        self
    }

    /// Extract and validate the configuration.
    pub fn extract(&self) -> Result<LilaConfig> {
        let config: LilaConfig = self
            .figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        validation::validate_config(&config)?;

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
