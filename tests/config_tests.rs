//! Configuration layering tests
//!
//! Each test uses its own environment prefix so parallel tests never
//! observe each other's variables.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use regressd::{build_service, AppConfig, Args};

#[test]
fn test_load_without_sources_gives_defaults() {
    let config = AppConfig::load_with_prefix(None, "REGRESSD_TEST_EMPTY").unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_load_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("regressd.toml");
    fs::write(
        &path,
        r#"
[server]
host = "127.0.0.1"
port = 8081

[database]
path = "/var/lib/regressd/models.db"

[models]
enabled = ["LinearRegression", "Ridge"]
"#,
    )
    .unwrap();

    let config = AppConfig::load_with_prefix(Some(&path), "REGRESSD_TEST_FILE").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8081);
    assert_eq!(
        config.database.path,
        PathBuf::from("/var/lib/regressd/models.db")
    );
    assert_eq!(config.models.enabled, vec!["LinearRegression", "Ridge"]);
    // untouched sections keep their defaults
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.server.max_body_bytes, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");
    assert!(AppConfig::load_with_prefix(Some(&path), "REGRESSD_TEST_MISSING").is_err());
}

#[test]
fn test_environment_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("regressd.toml");
    fs::write(&path, "[server]\nport = 8081\n").unwrap();

    std::env::set_var("REGRESSD_TEST_ENV__SERVER__PORT", "9090");
    std::env::set_var("REGRESSD_TEST_ENV__DATABASE__IN_MEMORY", "true");
    std::env::set_var("REGRESSD_TEST_ENV__MODELS__ENABLED", "Lasso,ElasticNet");
    std::env::set_var("REGRESSD_TEST_ENV__SERVER__MAX_BODY_BYTES", "1048576");

    let config = AppConfig::load_with_prefix(Some(&path), "REGRESSD_TEST_ENV").unwrap();
    assert_eq!(config.server.port, 9090);
    assert!(config.database.in_memory);
    assert_eq!(config.models.enabled, vec!["Lasso", "ElasticNet"]);
    assert_eq!(config.server.max_body_bytes, Some(1_048_576));
}

#[test]
fn test_cli_flags_win_over_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("regressd.toml");
    fs::write(&path, "[server]\nport = 8081\n[logging]\nlevel = \"warn\"\n").unwrap();

    let mut config = AppConfig::load_with_prefix(Some(&path), "REGRESSD_TEST_CLI").unwrap();
    let args = Args {
        port: Some(7000),
        log_level: Some("debug".to_string()),
        in_memory: true,
        ..Args::default()
    };
    config.apply_args(&args);

    assert_eq!(config.server.port, 7000);
    assert_eq!(config.logging.level, "debug");
    assert!(config.database.in_memory);
}

#[test]
fn test_unknown_class_in_file_fails_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("regressd.toml");
    fs::write(&path, "[models]\nenabled = [\"RandomForest\"]\n").unwrap();

    let config = AppConfig::load_with_prefix(Some(&path), "REGRESSD_TEST_UNKNOWN").unwrap();
    assert!(config.validate().is_err());
    assert!(build_service(&config).is_err());
}
