// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of the routing stack from configuration.

use std::sync::Arc;
use std::time::Duration;

use frugal_agent::{ChatRouter, ProviderRegistry, RouterSettings};
use frugal_cache::{CacheSettings, CacheStore, CleanupPolicy, SemanticCache};
use frugal_config::model::FrugalConfig;
use frugal_core::FrugalError;
use frugal_cost::CostLedger;
use frugal_knowledge::{KnowledgeCapitalizer, KnowledgeSettings};
use frugal_openai::{OpenAiCompatProvider, OpenAiEmbedder};
use frugal_storage::Database;
use tracing::{info, warn};

/// Slack on top of the router's own timeout for the HTTP client backstop.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Everything a CLI command needs.
pub struct App {
    pub router: ChatRouter,
    pub knowledge: KnowledgeCapitalizer,
    pub config: FrugalConfig,
}

impl App {
    /// Open storage, load the cache index and register configured providers.
    pub async fn build(config: FrugalConfig) -> Result<Self, FrugalError> {
        let database =
            Database::open(&config.storage.database_path, config.storage.wal_mode).await?;

        let embedder = Arc::new(OpenAiEmbedder::from_config(
            &config.embedding,
            config.cache.dimensions,
        )?);
        let store = CacheStore::new(database.clone());
        let cache = Arc::new(SemanticCache::new(
            store.clone(),
            embedder,
            cache_settings(&config),
        ));
        if config.cache.enabled {
            cache.load().await?;
        }

        let timeout = Duration::from_secs(config.routing.provider_timeout_secs);
        let mut registry = ProviderRegistry::new();
        for endpoint in &config.providers {
            let provider = OpenAiCompatProvider::from_config(endpoint, timeout + HTTP_TIMEOUT_SLACK)?;
            registry.register(Arc::new(provider));
        }
        if registry.is_empty() {
            warn!("no providers configured, every request will fail");
        }

        let settings = RouterSettings::from_config(&config)?;
        let router = ChatRouter::new(registry, cache, CostLedger::new(database), settings);
        let knowledge = KnowledgeCapitalizer::new(store, knowledge_settings(&config));

        info!(
            name = %config.general.name,
            database = %config.storage.database_path,
            "frugal initialized"
        );
        Ok(Self {
            router,
            knowledge,
            config,
        })
    }

    pub fn cleanup_policy(&self) -> CleanupPolicy {
        cleanup_policy(&self.config)
    }
}

pub fn cache_settings(config: &FrugalConfig) -> CacheSettings {
    CacheSettings {
        similarity_threshold: config.cache.similarity_threshold,
        capacity: config.cache.capacity,
        dimensions: config.cache.dimensions,
        feedback_delta: config.cache.feedback_delta,
    }
}

pub fn cleanup_policy(config: &FrugalConfig) -> CleanupPolicy {
    CleanupPolicy {
        min_quality: config.cache.cleanup_min_quality,
        max_uses: config.cache.cleanup_max_uses,
        min_age_days: config.cache.cleanup_min_age_days,
    }
}

pub fn knowledge_settings(config: &FrugalConfig) -> KnowledgeSettings {
    KnowledgeSettings {
        reuse_saturation: config.knowledge.reuse_saturation,
        min_entries_per_category: config.knowledge.min_entries_per_category,
        min_avg_quality: config.knowledge.min_avg_quality,
    }
}
