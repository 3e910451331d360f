// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes:
//! margins below 1, thresholds inside (0, 1], provider names that exist.

use std::collections::HashSet;
use std::str::FromStr;

use frugal_core::ProviderId;

use crate::diagnostic::ConfigError;
use crate::model::FrugalConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &FrugalConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let margin = config.cost.target_margin;
    if !(0.0..1.0).contains(&margin) {
        fail(format!(
            "cost.target_margin must be in [0, 1), got {margin}"
        ));
    }

    let threshold = config.cache.similarity_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        fail(format!(
            "cache.similarity_threshold must be in (0, 1], got {threshold}"
        ));
    }

    if config.cache.capacity == 0 {
        fail("cache.capacity must be at least 1".to_string());
    }

    if config.cache.dimensions == 0 {
        fail("cache.dimensions must be at least 1".to_string());
    }

    let delta = config.cache.feedback_delta;
    if !(delta > 0.0 && delta <= 1.0) {
        fail(format!(
            "cache.feedback_delta must be in (0, 1], got {delta}"
        ));
    }

    if config.routing.provider_timeout_secs == 0 {
        fail("routing.provider_timeout_secs must be at least 1".to_string());
    }

    let mut seen = HashSet::new();
    for name in &config.routing.fallback_order {
        match ProviderId::from_str(name) {
            Ok(id) => {
                if !seen.insert(id) {
                    fail(format!(
                        "routing.fallback_order lists `{name}` more than once"
                    ));
                }
            }
            Err(_) => fail(format!(
                "routing.fallback_order contains unknown provider `{name}`"
            )),
        }
    }

    let mut seen = HashSet::new();
    for (i, endpoint) in config.providers.iter().enumerate() {
        match ProviderId::from_str(&endpoint.id) {
            Ok(id) => {
                if !seen.insert(id) {
                    fail(format!("duplicate provider `{}` in [[providers]]", endpoint.id));
                }
            }
            Err(_) => fail(format!(
                "providers[{i}].id `{}` is not a known provider",
                endpoint.id
            )),
        }
        if endpoint.base_url.trim().is_empty() {
            fail(format!("providers[{i}].base_url must not be empty"));
        }
    }

    let knowledge = &config.knowledge;
    if knowledge.reuse_saturation == 0 {
        fail("knowledge.reuse_saturation must be at least 1".to_string());
    }
    for (key, value) in [
        ("knowledge.min_avg_quality", knowledge.min_avg_quality),
        ("knowledge.export_min_quality", knowledge.export_min_quality),
        ("cache.cleanup_min_quality", config.cache.cleanup_min_quality),
    ] {
        if !(0.0..=1.0).contains(&value) {
            fail(format!("{key} must be in [0, 1], got {value}"));
        }
    }

    if config.embedding.price_per_mtok < 0.0 {
        fail(format!(
            "embedding.price_per_mtok must be non-negative, got {}",
            config.embedding.price_per_mtok
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&FrugalConfig::default()).is_ok());
    }

    #[test]
    fn margin_of_one_is_rejected() {
        let mut config = FrugalConfig::default();
        config.cost.target_margin = 1.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "target_margin"));
    }

    #[test]
    fn negative_margin_is_rejected() {
        let mut config = FrugalConfig::default();
        config.cost.target_margin = -0.1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut config = FrugalConfig::default();
        config.cache.similarity_threshold = 0.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "similarity_threshold"));
    }

    #[test]
    fn unknown_fallback_provider_is_rejected() {
        let mut config = FrugalConfig::default();
        config.routing.fallback_order.push("acme".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "unknown provider `acme`"));
    }

    #[test]
    fn duplicate_fallback_provider_is_rejected() {
        let mut config = FrugalConfig::default();
        config.routing.fallback_order = vec!["groq".into(), "GROQ".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "more than once"));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = FrugalConfig::default();
        config.cost.target_margin = 2.0;
        config.cache.capacity = 0;
        config.storage.database_path = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
