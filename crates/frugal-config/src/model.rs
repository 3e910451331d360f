// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Frugal routing core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Frugal configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FrugalConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Semantic cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Model selection and provider fallback settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Pricing and margin settings.
    #[serde(default)]
    pub cost: CostConfig,

    /// Knowledge capitalization (rescoring, export, gap analysis).
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Embedding service endpoint.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// OpenAI-compatible provider endpoints, one per vendor.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderEndpointConfig>,
}

impl Default for FrugalConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            routing: RoutingConfig::default(),
            cost: CostConfig::default(),
            knowledge: KnowledgeConfig::default(),
            embedding: EmbeddingConfig::default(),
            providers: default_providers(),
        }
    }
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Instance name, used in log lines.
    #[serde(default = "default_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_name() -> String {
    "frugal".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("frugal").join("frugal.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("frugal.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Semantic cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Enable the semantic cache. When false, every request goes to a provider.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Minimum cosine similarity for a cache hit (0.0-1.0].
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Maximum number of entries held in the in-memory index.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Embedding dimensionality. Entries of any other length are ignored.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Signed quality change applied per feedback event.
    #[serde(default = "default_feedback_delta")]
    pub feedback_delta: f64,

    /// Cleanup removes entries below this quality...
    #[serde(default = "default_cleanup_min_quality")]
    pub cleanup_min_quality: f64,

    /// ...used at most this many times...
    #[serde(default = "default_cleanup_max_uses")]
    pub cleanup_max_uses: u32,

    /// ...and older than this many days.
    #[serde(default = "default_cleanup_min_age_days")]
    pub cleanup_min_age_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            similarity_threshold: default_similarity_threshold(),
            capacity: default_capacity(),
            dimensions: default_dimensions(),
            feedback_delta: default_feedback_delta(),
            cleanup_min_quality: default_cleanup_min_quality(),
            cleanup_max_uses: default_cleanup_max_uses(),
            cleanup_min_age_days: default_cleanup_min_age_days(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}

fn default_similarity_threshold() -> f32 {
    0.92
}

fn default_capacity() -> usize {
    10_000
}

fn default_dimensions() -> usize {
    1536 // text-embedding-3-small
}

fn default_feedback_delta() -> f64 {
    0.1
}

fn default_cleanup_min_quality() -> f64 {
    0.3
}

fn default_cleanup_max_uses() -> u32 {
    1
}

fn default_cleanup_min_age_days() -> u32 {
    30
}

/// Model routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Force all messages to a specific catalog model, bypassing selection.
    #[serde(default)]
    pub force_model: Option<String>,

    /// Providers tried, in order, after the selected provider fails.
    #[serde(default = "default_fallback_order")]
    pub fallback_order: Vec<String>,

    /// Per-call provider timeout. A timeout counts as a provider failure.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// System prompt used when the caller does not supply one.
    #[serde(default)]
    pub default_system_prompt: Option<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            force_model: None,
            fallback_order: default_fallback_order(),
            provider_timeout_secs: default_provider_timeout_secs(),
            default_system_prompt: None,
        }
    }
}

fn default_fallback_order() -> Vec<String> {
    ["groq", "gemini", "deepseek", "mistral", "openai", "anthropic"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

/// Pricing and margin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Fraction of the charged price kept as margin. Must be in [0, 1).
    #[serde(default = "default_target_margin")]
    pub target_margin: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            target_margin: default_target_margin(),
        }
    }
}

fn default_target_margin() -> f64 {
    0.30
}

/// Knowledge capitalization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfig {
    /// Use count at which the reuse signal saturates to 1.0.
    #[serde(default = "default_reuse_saturation")]
    pub reuse_saturation: u32,

    /// Categories with fewer entries are flagged by gap analysis.
    #[serde(default = "default_min_entries_per_category")]
    pub min_entries_per_category: usize,

    /// Categories with a lower average quality are flagged by gap analysis.
    #[serde(default = "default_min_avg_quality")]
    pub min_avg_quality: f64,

    /// Default quality floor for fine-tuning export.
    #[serde(default = "default_export_min_quality")]
    pub export_min_quality: f64,

    /// Default use-count floor for fine-tuning export.
    #[serde(default = "default_export_min_use_count")]
    pub export_min_use_count: u32,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            reuse_saturation: default_reuse_saturation(),
            min_entries_per_category: default_min_entries_per_category(),
            min_avg_quality: default_min_avg_quality(),
            export_min_quality: default_export_min_quality(),
            export_min_use_count: default_export_min_use_count(),
        }
    }
}

fn default_reuse_saturation() -> u32 {
    20
}

fn default_min_entries_per_category() -> usize {
    10
}

fn default_min_avg_quality() -> f64 {
    0.5
}

fn default_export_min_quality() -> f64 {
    0.7
}

fn default_export_min_use_count() -> u32 {
    3
}

/// Embedding service configuration (OpenAI-compatible `/embeddings`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Base URL of the embeddings API.
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// API key. `None` falls back to `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default = "default_embedding_api_key_env")]
    pub api_key_env: String,

    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Price in USD per million input tokens.
    #[serde(default = "default_embedding_price")]
    pub price_per_mtok: f64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_base_url(),
            api_key: None,
            api_key_env: default_embedding_api_key_env(),
            model: default_embedding_model(),
            price_per_mtok: default_embedding_price(),
        }
    }
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_price() -> f64 {
    0.02
}

/// One OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderEndpointConfig {
    /// Provider identifier (groq, gemini, deepseek, mistral, openai, anthropic).
    pub id: String,

    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,

    /// API key. `None` falls back to `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl ProviderEndpointConfig {
    fn new(id: &str, base_url: &str, api_key_env: &str) -> Self {
        Self {
            id: id.to_string(),
            base_url: base_url.to_string(),
            api_key: None,
            api_key_env: Some(api_key_env.to_string()),
        }
    }

    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            self.api_key_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|v| !v.is_empty())
        })
    }
}

impl EmbeddingConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|v| !v.is_empty())
    }
}

fn default_providers() -> Vec<ProviderEndpointConfig> {
    vec![
        ProviderEndpointConfig::new("groq", "https://api.groq.com/openai/v1", "GROQ_API_KEY"),
        ProviderEndpointConfig::new(
            "gemini",
            "https://generativelanguage.googleapis.com/v1beta/openai",
            "GEMINI_API_KEY",
        ),
        ProviderEndpointConfig::new("deepseek", "https://api.deepseek.com/v1", "DEEPSEEK_API_KEY"),
        ProviderEndpointConfig::new("mistral", "https://api.mistral.ai/v1", "MISTRAL_API_KEY"),
        ProviderEndpointConfig::new("openai", "https://api.openai.com/v1", "OPENAI_API_KEY"),
        ProviderEndpointConfig::new(
            "anthropic",
            "https://api.anthropic.com/v1",
            "ANTHROPIC_API_KEY",
        ),
    ]
}
