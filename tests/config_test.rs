//! Integration tests for layered parser settings.
//!
//! Precedence, lowest to highest: defaults, global file, explicit file,
//! environment. Every test uses its own env prefix so tests may run in
//! parallel without seeing each other's variables.

use std::env;
use std::fs;

use tempfile::TempDir;

use argtree::config::{global_config_path, ParserSettings};
use argtree::infrastructure::InfraError;

#[test]
fn given_explicit_file_when_loading_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("argtree.toml");
    fs::write(&path, "strict = true\nsuggestion_distance = 4\n").unwrap();

    // Act
    let settings =
        ParserSettings::load_layers(None, Some(&path), "ARGTREE_IT_EXPLICIT").unwrap();

    // Assert
    assert!(settings.strict);
    assert_eq!(settings.suggestion_distance, 4);
    assert!(settings.case_sensitive, "unspecified fields keep their defaults");
}

#[test]
fn given_global_and_explicit_files_when_loading_then_explicit_wins() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("global.toml");
    let explicit = dir.path().join("explicit.toml");
    fs::write(&global, "strict = true\nsuggestions = false\n").unwrap();
    fs::write(&explicit, "strict = false\n").unwrap();

    // Act
    let settings =
        ParserSettings::load_layers(Some(&global), Some(&explicit), "ARGTREE_IT_LAYERS").unwrap();

    // Assert
    assert!(!settings.strict);
    assert!(!settings.suggestions, "global value survives when explicit is silent");
}

#[test]
fn given_missing_global_file_when_loading_then_it_is_skipped() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("absent.toml");

    let settings = ParserSettings::load_layers(Some(&global), None, "ARGTREE_IT_ABSENT").unwrap();

    assert_eq!(settings, ParserSettings::default());
}

#[test]
fn given_missing_explicit_file_when_loading_then_fails() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("absent.toml");

    let err = ParserSettings::load_layers(None, Some(&explicit), "ARGTREE_IT_MISSING").unwrap_err();

    assert!(matches!(err, InfraError::Config { .. }));
}

#[test]
fn given_malformed_file_when_loading_then_config_error_names_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "strict = [not toml").unwrap();

    // Act
    let err = ParserSettings::load_layers(None, Some(&path), "ARGTREE_IT_BROKEN").unwrap_err();

    // Assert
    match err {
        InfraError::Config { message } => assert!(message.contains("broken.toml"), "{message}"),
        other => panic!("expected config error, got {other}"),
    }
}

#[test]
fn given_env_variable_when_loading_then_overrides_files() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("argtree.toml");
    fs::write(&path, "strict = true\n").unwrap();
    env::set_var("ARGTREE_IT_ENV_STRICT", "false");
    env::set_var("ARGTREE_IT_ENV_SUGGESTION_DISTANCE", "5");

    // Act
    let settings = ParserSettings::load_layers(None, Some(&path), "ARGTREE_IT_ENV").unwrap();

    // Assert
    assert!(!settings.strict);
    assert_eq!(settings.suggestion_distance, 5);

    env::remove_var("ARGTREE_IT_ENV_STRICT");
    env::remove_var("ARGTREE_IT_ENV_SUGGESTION_DISTANCE");
}

#[test]
fn given_effective_settings_when_serialized_then_reloads_equal() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.toml");
    let settings = ParserSettings {
        strict: true,
        suggestion_distance: 1,
        ..ParserSettings::default()
    };

    // Act
    fs::write(&path, settings.to_toml().unwrap()).unwrap();
    let reloaded = ParserSettings::load_layers(None, Some(&path), "ARGTREE_IT_SAVED").unwrap();

    // Assert
    assert_eq!(reloaded, settings);
}

#[test]
fn given_app_name_when_locating_global_file_then_uses_app_toml() {
    if let Some(path) = global_config_path("my-tool") {
        assert_eq!(path.file_name().unwrap(), "my-tool.toml");
    }
}
