// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./frugal.toml` > `~/.config/frugal/frugal.toml` > `/etc/frugal/frugal.toml`
//! with environment variable overrides via `FRUGAL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FrugalConfig;

/// Sections addressable from `FRUGAL_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "general",
    "storage",
    "cache",
    "routing",
    "cost",
    "knowledge",
    "embedding",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/frugal/frugal.toml` (system-wide)
/// 3. `~/.config/frugal/frugal.toml` (user XDG config)
/// 4. `./frugal.toml` (local directory)
/// 5. `FRUGAL_*` environment variables
pub fn load_config() -> Result<FrugalConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FrugalConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FrugalConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FrugalConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FrugalConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FrugalConfig::default()))
        .merge(Toml::file("/etc/frugal/frugal.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("frugal/frugal.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("frugal.toml"))
        .merge(env_provider())
}

/// Map `FRUGAL_CACHE_SIMILARITY_THRESHOLD` to `cache.similarity_threshold`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that themselves contain underscores survive intact.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("FRUGAL_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}
