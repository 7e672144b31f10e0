//! Layered configuration loading: defaults, files, environment

use std::io::Write;
use std::time::Duration;

use lila::config::{ConfigLoader, LogFormat, LogLevel, StorageBackend};
use lila::relationships::MissingRelationshipPolicy;
use lila::storage::StoreMode;

#[test]
fn test_explicit_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[storage]
backend = "memory"
seed_demo_data = false
missing_relationship = "reject"

[storage.surrealdb]
endpoint = "ws://graph:8000"
retry_delay = "750ms"

[logging]
level = "warn"
format = "json"
"#
    )
    .unwrap();

    let config = ConfigLoader::new()
        .load_file(file.path())
        .unwrap()
        .extract()
        .unwrap();

    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert!(!config.storage.seed_demo_data);
    assert_eq!(
        config.storage.missing_relationship,
        Some(MissingRelationshipPolicy::Reject)
    );
    assert_eq!(config.storage.surrealdb.endpoint, "ws://graph:8000");
    assert_eq!(config.storage.surrealdb.retry_delay, Duration::from_millis(750));
    // Untouched keys keep their defaults
    assert_eq!(config.storage.surrealdb.namespace, "lila");
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
    assert!(ConfigLoader::new().load_file(file.path()).is_err());
    assert!(ConfigLoader::new().load_file("/definitely/not/here.toml").is_err());
}

#[test]
fn test_invalid_values_fail_validation() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"storage": {{"surrealdb": {{"max_connect_attempts": 0}}}}}}"#).unwrap();

    let err = ConfigLoader::new()
        .load_file(file.path())
        .unwrap()
        .extract()
        .unwrap_err();
    assert!(err.to_string().contains("max_connect_attempts"));
}

#[test]
fn test_layers_apply_in_order() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "lila.yaml",
            r#"
storage:
  surrealdb:
    endpoint: "ws://from-file:8000"
    namespace: "file_ns"
logging:
  level: "error"
"#,
        )?;
        jail.set_env("LILA_STORAGE__SURREALDB__NAMESPACE", "env_ns");
        jail.set_env("SURREALDB_URL", "http://from-shortcut:8000");
        jail.set_env("SURREALDB_USERNAME", "root");
        jail.set_env("SURREALDB_PASSWORD", "root");

        let config = ConfigLoader::layered(None)
            .expect("layered loader")
            .extract()
            .expect("valid config");

        assert_eq!(config.storage.surrealdb.endpoint, "http://from-shortcut:8000");
        assert_eq!(config.storage.surrealdb.namespace, "env_ns");
        assert_eq!(config.logging.level, LogLevel::Error);
        let auth = config.storage.surrealdb.auth.expect("auth from env");
        assert_eq!(auth.username, "root");
        Ok(())
    });
}

#[test]
fn test_memory_backend_from_env_initializes_fallback_store() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("LILA_STORAGE__BACKEND", "memory");

        let config = ConfigLoader::new().load_env().extract().expect("valid config");
        let handle = tokio_test::block_on(lila::init(config)).expect("store opens");
        assert_eq!(tokio_test::block_on(handle.mode()), StoreMode::Fallback);
        Ok(())
    });
}
