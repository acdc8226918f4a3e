//! Unit tests for configuration loading and graceful degradation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate STAYPRICE_CONFIG are marked with #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use stayprice_common::config::{ConfigResolver, TomlConfig, CONFIG_ENV_VAR};
use stayprice_common::{Error, Field};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_config_file() {
    let file = write_config(
        r#"
bind = "0.0.0.0"
port = 8080
model_path = "/opt/stayprice/model.json"
max_predictions = 32

[logging]
level = "debug"
file = "/var/log/stayprice.log"

[defaults]
n_guest = 3
rating = 4.5

[sweep]
rating = [3.0, 4.0, 5.0]
"#,
    );

    let config = TomlConfig::load(file.path()).unwrap();
    assert_eq!(config.bind, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.model_path(), PathBuf::from("/opt/stayprice/model.json"));
    assert_eq!(config.prediction_budget(), Some(32));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.logging.file,
        Some(PathBuf::from("/var/log/stayprice.log"))
    );

    let schema = config.schema().unwrap();
    assert_eq!(schema.defaults().get(Field::Guests), Some(3.0));
    assert_eq!(schema.defaults().get(Field::Rating), Some(4.5));
    assert_eq!(schema.sweeps().get(Field::Rating), Some(&[3.0, 4.0, 5.0][..]));
    assert_eq!(
        schema.sweeps().get(Field::Beds),
        Some(&[1.0, 2.0, 3.0, 4.0][..])
    );
}

#[test]
fn test_unknown_override_field_is_configuration_error() {
    let file = write_config("[sweep]\nn_pools = [0, 1]\n");
    let config = TomlConfig::load(file.path()).unwrap();
    assert!(matches!(config.schema(), Err(Error::Config(_))));
}

#[test]
fn test_empty_sweep_override_is_configuration_error() {
    let file = write_config("[sweep]\nrating = []\n");
    let config = TomlConfig::load(file.path()).unwrap();
    assert!(matches!(config.schema(), Err(Error::Config(_))));
}

#[test]
fn test_repeated_sweep_candidates_are_configuration_error() {
    let file = write_config("[sweep]\nrating = [3, 3, 5]\n");
    let config = TomlConfig::load(file.path()).unwrap();
    assert!(matches!(config.schema(), Err(Error::Config(ref msg)) if msg.contains("rating")));
}

#[test]
fn test_candidates_printing_alike_are_configuration_error() {
    let file = write_config("[sweep]\nn_guest = [2, 3, 3.0]\n");
    let config = TomlConfig::load(file.path()).unwrap();
    assert!(matches!(config.schema(), Err(Error::Config(_))));
}

#[test]
fn test_malformed_file_is_fatal() {
    let file = write_config("port = \"not a number\"\n");
    let err = TomlConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("Invalid TOML")));
}

#[test]
#[serial]
fn test_explicit_path_takes_precedence() {
    let explicit = write_config("port = 7001\n");
    let from_env = write_config("port = 7002\n");
    env::set_var(CONFIG_ENV_VAR, from_env.path());

    let resolver = ConfigResolver::new(Some(explicit.path().to_path_buf()));
    assert_eq!(resolver.load().unwrap().port, 7001);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_path() {
    let file = write_config("port = 7003\n");
    env::set_var(CONFIG_ENV_VAR, file.path());

    let resolver = ConfigResolver::new(None);
    assert_eq!(resolver.resolve(), Some(file.path().to_path_buf()));
    assert_eq!(resolver.load().unwrap().port, 7003);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_configuration_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let resolver = ConfigResolver::new(Some(PathBuf::from("/nonexistent/stayprice.toml")));

    let err = resolver.load().unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("/nonexistent/stayprice.toml")));
}

#[test]
#[serial]
fn test_missing_env_var_file_is_configuration_error() {
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/from-env.toml");

    let result = ConfigResolver::new(None).load();
    env::remove_var(CONFIG_ENV_VAR);

    assert!(matches!(result, Err(Error::Config(ref msg)) if msg.contains("from-env.toml")));
}

#[test]
#[serial]
fn test_empty_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "");

    let resolver = ConfigResolver::new(None);
    let resolved = resolver.resolve();
    env::remove_var(CONFIG_ENV_VAR);

    assert_ne!(resolved, Some(PathBuf::new()));
}
