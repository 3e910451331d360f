// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Frugal configuration system.

use frugal_config::diagnostic::ConfigError;
use frugal_config::model::FrugalConfig;
use frugal_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_frugal_config() {
    let toml = r#"
[general]
name = "frugal-test"
log_level = "debug"

[storage]
database_path = "/tmp/frugal-test.db"
wal_mode = false

[cache]
similarity_threshold = 0.9
capacity = 500

[routing]
force_model = "gpt-4o-mini"
fallback_order = ["gemini", "groq"]
provider_timeout_secs = 10

[cost]
target_margin = 0.25

[[providers]]
id = "groq"
base_url = "http://localhost:9000/v1"
api_key = "gsk-test"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.name, "frugal-test");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/frugal-test.db");
    assert!(!config.storage.wal_mode);
    assert!((config.cache.similarity_threshold - 0.9).abs() < f32::EPSILON);
    assert_eq!(config.cache.capacity, 500);
    assert_eq!(config.routing.force_model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(config.routing.fallback_order, vec!["gemini", "groq"]);
    assert_eq!(config.routing.provider_timeout_secs, 10);
    assert!((config.cost.target_margin - 0.25).abs() < f64::EPSILON);
    assert_eq!(config.providers.len(), 1);
    assert_eq!(config.providers[0].api_key.as_deref(), Some("gsk-test"));
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    let defaults = FrugalConfig::default();
    assert_eq!(config.cache.capacity, defaults.cache.capacity);
    assert!((config.cache.similarity_threshold - 0.92).abs() < f32::EPSILON);
    assert!((config.cost.target_margin - 0.30).abs() < f64::EPSILON);
    assert_eq!(config.providers.len(), 6);
}

#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[cache]
similarity_treshold = 0.9
"#;

    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "similarity_treshold");
            assert_eq!(suggestion.as_deref(), Some("similarity_threshold"));
            assert!(span.is_some());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[cache]
capacity = "lots"
"#;

    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "expected InvalidType, got {errors:?}"
    );
}

#[test]
fn margin_at_or_above_one_fails_validation() {
    let toml = r#"
[cost]
target_margin = 1.0
"#;

    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("target_margin")
    )));
}

#[test]
fn unknown_provider_id_fails_validation() {
    let toml = r#"
[[providers]]
id = "acme"
base_url = "http://localhost"
"#;

    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("acme")
    )));
}

#[test]
fn valid_config_passes_validation() {
    let toml = r#"
[cost]
target_margin = 0.5
"#;
    let config = load_and_validate_str(toml).expect("should validate");
    assert!((config.cost.target_margin - 0.5).abs() < f64::EPSILON);
}

#[test]
#[serial_test::serial]
fn env_var_overrides_file_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frugal.toml");
    std::fs::write(&path, "[cost]\ntarget_margin = 0.4\n").unwrap();

    // SAFETY: serialized with other env-mutating tests.
    unsafe { std::env::set_var("FRUGAL_COST_TARGET_MARGIN", "0.25") };
    let result = load_and_validate_path(&path);
    unsafe { std::env::remove_var("FRUGAL_COST_TARGET_MARGIN") };

    let config = result.expect("should validate");
    assert!((config.cost.target_margin - 0.25).abs() < f64::EPSILON);
}

#[test]
#[serial_test::serial]
fn file_value_applies_without_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frugal.toml");
    std::fs::write(&path, "[cache]\nsimilarity_threshold = 0.88\n").unwrap();

    let config = load_and_validate_path(&path).expect("should validate");
    assert!((config.cache.similarity_threshold - 0.88).abs() < f32::EPSILON);
}
