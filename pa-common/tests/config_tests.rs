//! Integration tests for bootstrap configuration resolution
//!
//! Covers:
//! - Priority order: CLI > environment > TOML > compiled default
//! - Missing TOML file falls back to defaults
//! - Malformed TOML file aborts resolution
//!
//! Tests that touch PA_* environment variables are marked #[serial].

use pa_common::config::{
    CliOverrides, CompiledDefaults, ServiceConfig, TomlConfig, ENV_ARTIFACT_FOLDER, ENV_CONFIG,
    ENV_PORT,
};
use pa_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_env() {
    env::remove_var(ENV_ARTIFACT_FOLDER);
    env::remove_var(ENV_PORT);
    env::remove_var(ENV_CONFIG);
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let config = ServiceConfig::resolve_with(&CliOverrides::default(), TomlConfig::default()).unwrap();
    let defaults = CompiledDefaults::for_current_platform();

    assert_eq!(config.port, 8000);
    assert_eq!(config.bind_address, "127.0.0.1");
    assert_eq!(config.artifact_folder, defaults.artifact_folder);
    assert_eq!(config.artifacts.artists, defaults.artifact_folder.join("artists.json"));
    assert_eq!(config.log_level, defaults.log_level);
}

#[test]
#[serial]
fn test_toml_overrides_defaults() {
    clear_env();

    let toml = TomlConfig::from_toml_str(
        r#"
        port = 9001
        bind_address = "0.0.0.0"
        artifact_folder = "/srv/pa"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let config = ServiceConfig::resolve_with(&CliOverrides::default(), toml).unwrap();

    assert_eq!(config.port, 9001);
    assert_eq!(config.bind_address, "0.0.0.0");
    assert_eq!(config.artifact_folder, PathBuf::from("/srv/pa"));
    assert_eq!(config.artifacts.venues, PathBuf::from("/srv/pa/venues.json"));
    assert_eq!(config.log_level, "debug");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_ARTIFACT_FOLDER, "/tmp/pa-env-folder");
    env::set_var(ENV_PORT, "9200");

    let toml = TomlConfig::from_toml_str("port = 9001\nartifact_folder = \"/srv/pa\"").unwrap();
    let config = ServiceConfig::resolve_with(&CliOverrides::default(), toml).unwrap();

    assert_eq!(config.artifact_folder, PathBuf::from("/tmp/pa-env-folder"));
    assert_eq!(config.port, 9200);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_ARTIFACT_FOLDER, "/tmp/pa-env-folder");
    env::set_var(ENV_PORT, "9200");

    let cli = CliOverrides {
        artifact_folder: Some(PathBuf::from("/tmp/pa-cli-folder")),
        port: Some(9300),
        bind_address: Some("0.0.0.0".to_string()),
        ..CliOverrides::default()
    };
    let config = ServiceConfig::resolve_with(&cli, TomlConfig::default()).unwrap();

    assert_eq!(config.artifact_folder, PathBuf::from("/tmp/pa-cli-folder"));
    assert_eq!(config.port, 9300);
    assert_eq!(config.bind_address, "0.0.0.0");

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_port_is_config_error() {
    clear_env();
    env::set_var(ENV_PORT, "eighty");

    let result = ServiceConfig::resolve_with(&CliOverrides::default(), TomlConfig::default());
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_missing_config_file_uses_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();

    let cli = CliOverrides {
        config_file: Some(dir.path().join("does-not-exist.toml")),
        ..CliOverrides::default()
    };
    let config = ServiceConfig::resolve(&cli).unwrap();

    assert_eq!(config.port, 8000);
    assert!(config.config_file.is_none());
}

#[test]
#[serial]
fn test_config_file_from_env_var() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pa.toml");
    std::fs::write(&path, "port = 9444\n[artifacts]\nmatrix = \"interactions.json\"\n").unwrap();
    env::set_var(ENV_CONFIG, &path);

    let config = ServiceConfig::resolve(&CliOverrides::default()).unwrap();

    assert_eq!(config.port, 9444);
    assert_eq!(config.config_file.as_deref(), Some(path.as_path()));
    assert!(config.artifacts.matrix.ends_with("interactions.json"));

    clear_env();
}

#[test]
#[serial]
fn test_malformed_config_file_is_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "port = [this is not toml").unwrap();

    let cli = CliOverrides {
        config_file: Some(path),
        ..CliOverrides::default()
    };
    let result = ServiceConfig::resolve(&cli);

    assert!(matches!(result, Err(Error::Config(_))));
}
