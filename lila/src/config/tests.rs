#[cfg(test)]
mod tests {
    use crate::config::{
        ConfigBuilder, ConfigLoader, LilaConfig, LogFormat, LogLevel, StorageBackend, validation,
    };
    use crate::relationships::MissingRelationshipPolicy;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = LilaConfig::default();
        assert_eq!(config.storage.backend, StorageBackend::SurrealDB);
        assert_eq!(config.storage.surrealdb.endpoint, "ws://localhost:8000");
        assert_eq!(config.storage.surrealdb.namespace, "lila");
        assert_eq!(config.storage.surrealdb.database, "relationships");
        assert!(config.storage.fallback_on_unavailable);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_config_builder_with_surrealdb() {
        let config = ConfigBuilder::new()
            .with_surrealdb_endpoint("ws://db:8000")
            .with_namespace("tests")
            .with_root_auth("root", "secret")
            .with_connect_retry(3, Duration::from_millis(10))
            .with_missing_relationship_policy(MissingRelationshipPolicy::CreateDefault)
            .with_log_level(LogLevel::Debug)
            .build()
            .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::SurrealDB);
        assert_eq!(config.storage.surrealdb.endpoint, "ws://db:8000");
        assert_eq!(config.storage.surrealdb.namespace, "tests");
        assert_eq!(config.storage.surrealdb.max_connect_attempts, 3);
        assert_eq!(
            config.storage.surrealdb.auth.as_ref().map(|a| a.username.as_str()),
            Some("root")
        );
        assert_eq!(
            config.storage.missing_relationship,
            Some(MissingRelationshipPolicy::CreateDefault)
        );
    }

    #[test]
    fn test_validation_rejects_bad_storage_settings() {
        assert!(ConfigBuilder::new().with_namespace("").build().is_err());
        assert!(ConfigBuilder::new().with_database("  ").build().is_err());
        assert!(
            ConfigBuilder::new()
                .with_connect_retry(0, Duration::from_secs(1))
                .build()
                .is_err()
        );
        assert!(
            ConfigBuilder::new()
                .with_surrealdb_endpoint("localhost:8000")
                .build()
                .is_err()
        );
        assert!(validation::validate_config(&LilaConfig::default()).is_ok());
    }

    #[test]
    fn test_predefined_configs() {
        let dev = ConfigBuilder::development().build().unwrap();
        let test = ConfigBuilder::testing().build().unwrap();

        assert_eq!(dev.storage.backend, StorageBackend::Memory);
        assert!(dev.storage.seed_demo_data);
        assert_eq!(dev.logging.level, LogLevel::Debug);
        assert_eq!(test.storage.backend, StorageBackend::Memory);
        assert_eq!(test.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_embedded_preset_uses_mem_engine() {
        let config = ConfigBuilder::new().with_embedded_surrealdb().build().unwrap();
        assert_eq!(config.storage.surrealdb.endpoint, "mem://");
        assert!(config.storage.surrealdb.is_embedded());
    }

    #[test]
    fn test_env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LILA_STORAGE__BACKEND", "memory");
            jail.set_env("LILA_STORAGE__SURREALDB__RETRY_DELAY", "250ms");
            jail.set_env("LILA_LOGGING__LEVEL", "debug");

            let config = ConfigLoader::new().load_env().extract().unwrap();
            assert_eq!(config.storage.backend, StorageBackend::Memory);
            assert_eq!(config.storage.surrealdb.retry_delay, Duration::from_millis(250));
            assert_eq!(config.logging.level, LogLevel::Debug);
            Ok(())
        });
    }

    #[test]
    fn test_config_serialization() {
        let config = ConfigBuilder::new()
            .with_surrealdb_endpoint("http://db:8000")
            .with_log_format(LogFormat::Json)
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: LilaConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, deserialized);
    }
}
