//! Unit tests for configuration resolution
//!
//! Tests the priority order command line > environment > TOML > defaults and
//! graceful handling of missing config files.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate PT_* variables are marked with #[serial].

use pt_common::config::{
    load_toml_config, CliOverrides, ServiceConfig, TomlConfig, DEFAULT_BIND, DEFAULT_PORT,
    ENV_BIND, ENV_PORT, ENV_ROOT_FOLDER,
};
use pt_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_env() {
    env::remove_var(ENV_ROOT_FOLDER);
    env::remove_var(ENV_PORT);
    env::remove_var(ENV_BIND);
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let config = ServiceConfig::resolve(&CliOverrides::default(), &TomlConfig::default()).unwrap();

    assert_eq!(config.root_folder, PathBuf::from("."));
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.bind, DEFAULT_BIND);
    assert_eq!(config.human_poem_count, 100);
    assert_eq!(config.ai_poem_count, 100);
    assert_eq!(config.results_path, PathBuf::from("./results.csv"));
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_ROOT_FOLDER, "/tmp/pt-test-env-root");
    env::set_var(ENV_PORT, "6001");

    let toml_config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/pt-test-toml-root")),
        port: Some(6002),
        bind: Some("0.0.0.0".to_string()),
        ..Default::default()
    };
    let config = ServiceConfig::resolve(&CliOverrides::default(), &toml_config).unwrap();

    assert_eq!(config.root_folder, PathBuf::from("/tmp/pt-test-env-root"));
    assert_eq!(config.port, 6001);
    // Not set in the environment, so TOML applies
    assert_eq!(config.bind, "0.0.0.0");

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_ROOT_FOLDER, "/tmp/pt-test-env-root");

    let cli = CliOverrides {
        root_folder: Some(PathBuf::from("/tmp/pt-test-cli-root")),
        ..Default::default()
    };
    let config = ServiceConfig::resolve(&cli, &TomlConfig::default()).unwrap();

    assert_eq!(config.root_folder, PathBuf::from("/tmp/pt-test-cli-root"));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_port_is_config_error() {
    clear_env();
    env::set_var(ENV_PORT, "eighty");

    let result = ServiceConfig::resolve(&CliOverrides::default(), &TomlConfig::default());
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_relative_results_file_joins_root_folder() {
    clear_env();

    let toml_config = TomlConfig {
        root_folder: Some(PathBuf::from("/srv/poems")),
        results_file: Some(PathBuf::from("data/judgments.csv")),
        ..Default::default()
    };
    let config = ServiceConfig::resolve(&CliOverrides::default(), &toml_config).unwrap();

    assert_eq!(config.results_path, PathBuf::from("/srv/poems/data/judgments.csv"));
}

#[test]
fn test_explicit_config_file_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 7000\nai_poem_count = 25\n").unwrap();

    let config = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.port, Some(7000));
    assert_eq!(config.ai_poem_count, Some(25));
}

#[test]
fn test_explicit_config_file_missing_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let result = load_toml_config(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_config_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = [").unwrap();

    let result = load_toml_config(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}
