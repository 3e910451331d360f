// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete routing stack with mock adapters
//! and a temp SQLite database. Every catalog provider is registered as a
//! [`MockProvider`]; all of them pop from one shared reply queue so a
//! scripted reply is used by whichever provider ends up answering.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use frugal_agent::{
    ChatRouter, DEFAULT_FALLBACK_ORDER, ProviderRegistry, RouteOptions, RouteResponse,
    RouterSettings,
};
use frugal_cache::{CacheSettings, CacheStore, SemanticCache};
use frugal_core::{FrugalError, ProviderId};
use frugal_cost::{CostLedger, TargetMargin};
use frugal_storage::Database;

use crate::mock_embedder::MockEmbedder;
use crate::mock_provider::MockProvider;

/// Embedding width used by the harness.
pub const HARNESS_DIMENSIONS: usize = 64;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    settings: RouterSettings,
    cache: CacheSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            settings: RouterSettings {
                provider_timeout: Duration::from_secs(5),
                ..RouterSettings::default()
            },
            cache: CacheSettings {
                dimensions: HARNESS_DIMENSIONS,
                ..CacheSettings::default()
            },
        }
    }

    /// Set mock provider replies.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_target_margin(mut self, margin: TargetMargin) -> Self {
        self.settings.target_margin = margin;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache.capacity = capacity;
        self
    }

    pub fn with_cache_disabled(mut self) -> Self {
        self.settings.cache_enabled = false;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.settings.default_system_prompt = Some(prompt.into());
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, FrugalError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| FrugalError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let database = Database::open(&db_path.to_string_lossy(), true).await?;

        let embedder = Arc::new(MockEmbedder::new(self.cache.dimensions));
        let cache = Arc::new(SemanticCache::new(
            CacheStore::new(database.clone()),
            embedder.clone(),
            self.cache,
        ));
        cache.load().await?;

        let primary = Arc::new(MockProvider::with_responses(
            DEFAULT_FALLBACK_ORDER[0],
            self.responses,
        ));
        let mut providers = HashMap::new();
        let mut registry = ProviderRegistry::new();
        for id in DEFAULT_FALLBACK_ORDER {
            let provider = if id == DEFAULT_FALLBACK_ORDER[0] {
                Arc::clone(&primary)
            } else {
                Arc::new(MockProvider::sharing_replies(id, &primary))
            };
            registry.register(provider.clone());
            providers.insert(id, provider);
        }

        let ledger = CostLedger::new(database.clone());
        let router = ChatRouter::new(registry, cache, ledger, self.settings);

        Ok(TestHarness {
            router,
            providers,
            embedder,
            database,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete routing stack with mock adapters and temp storage.
pub struct TestHarness {
    pub router: ChatRouter,
    pub embedder: Arc<MockEmbedder>,
    /// Shared database (temp file, cleaned up on drop).
    pub database: Database,
    providers: HashMap<ProviderId, Arc<MockProvider>>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Route `message` as an anonymous free-tier user with no history.
    pub async fn send_message(&self, message: &str) -> Result<RouteResponse, FrugalError> {
        self.router.route(message, &[], RouteOptions::default()).await
    }

    /// Route `message` with explicit options.
    pub async fn send_with(
        &self,
        message: &str,
        options: RouteOptions,
    ) -> Result<RouteResponse, FrugalError> {
        self.router.route(message, &[], options).await
    }

    /// The mock registered for `id`.
    pub fn provider(&self, id: ProviderId) -> &Arc<MockProvider> {
        &self.providers[&id]
    }

    /// Make every provider fail with `message`.
    pub async fn fail_all_providers(&self, message: &str) {
        for provider in self.providers.values() {
            provider.set_failing(Some(message.to_string())).await;
        }
    }

    /// Total provider calls across every mock.
    pub async fn provider_calls(&self) -> usize {
        let mut total = 0;
        for provider in self.providers.values() {
            total += provider.call_count().await;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_routes_to_scripted_reply() {
        let harness = TestHarness::builder()
            .with_mock_responses(vec!["scripted".into()])
            .build()
            .await
            .unwrap();

        let resp = harness.send_message("hi").await.unwrap();
        assert_eq!(resp.content, "scripted");
        assert_eq!(harness.provider_calls().await, 1);
    }

    #[tokio::test]
    async fn harness_registers_every_provider() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert_eq!(harness.router.registry().len(), DEFAULT_FALLBACK_ORDER.len());
        for id in DEFAULT_FALLBACK_ORDER {
            assert!(harness.router.registry().contains(id), "{id} not registered");
        }
        assert_eq!(harness.provider(ProviderId::Anthropic).call_count().await, 0);
    }
}
