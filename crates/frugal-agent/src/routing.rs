// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The routing pipeline: cache check, classification, model selection,
//! provider invocation with fallback, cost accounting and cache population.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use frugal_cache::{CacheLookup, Feedback, NewCacheEntry, SemanticCache};
use frugal_config::model::FrugalConfig;
use frugal_core::{
    Category, ChatMessage, CostTier, FrugalError, ProviderId, ProviderRequest, UserTier,
};
use frugal_cost::{
    CostLedger, CostRecord, MarginBreakdown, RequestType, TargetMargin, UsageExtras,
    calculate_cost,
};
use frugal_router::{ComplexityClassifier, ModelDescriptor, ModelSelector, find_model};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::fallback::{DEFAULT_FALLBACK_ORDER, FallbackChain};
use crate::metrics;
use crate::registry::ProviderRegistry;

/// Router-wide knobs, usually derived from [`FrugalConfig`].
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub target_margin: TargetMargin,
    /// Model used for every request unless the request forces another.
    pub force_model: Option<String>,
    pub default_system_prompt: Option<String>,
    pub cache_enabled: bool,
    pub fallback_order: Vec<ProviderId>,
    pub provider_timeout: Duration,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            target_margin: TargetMargin::default(),
            force_model: None,
            default_system_prompt: None,
            cache_enabled: true,
            fallback_order: DEFAULT_FALLBACK_ORDER.to_vec(),
            provider_timeout: Duration::from_secs(30),
        }
    }
}

impl RouterSettings {
    pub fn from_config(config: &FrugalConfig) -> Result<Self, FrugalError> {
        let fallback_order = config
            .routing
            .fallback_order
            .iter()
            .map(|id| {
                ProviderId::from_str(id)
                    .map_err(|_| FrugalError::Config(format!("unknown provider `{id}`")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            target_margin: TargetMargin::new(config.cost.target_margin)?,
            force_model: config.routing.force_model.clone(),
            default_system_prompt: config.routing.default_system_prompt.clone(),
            cache_enabled: config.cache.enabled,
            fallback_order,
            provider_timeout: Duration::from_secs(config.routing.provider_timeout_secs),
        })
    }
}

/// Per-request options supplied by the caller.
#[derive(Debug, Clone)]
pub struct RouteOptions {
    pub user_tier: UserTier,
    pub user_id: String,
    pub system_prompt: Option<String>,
    pub language: Option<String>,
    pub force_model: Option<String>,
    /// Neither read from nor write to the semantic cache.
    pub skip_cache: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            user_tier: UserTier::Free,
            user_id: "anonymous".to_string(),
            system_prompt: None,
            language: None,
            force_model: None,
            skip_cache: false,
        }
    }
}

/// What an answer cost and what it is billed at, in USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostInfo {
    /// Total spend: provider cost plus embedding cost.
    pub cost_usd: f64,
    pub price_usd: f64,
    pub margin_usd: f64,
    pub margin_pct: f64,
    /// Share of `cost_usd` spent on embedding the question.
    pub embedding_cost_usd: f64,
    /// Spend avoided by serving from cache.
    pub cache_savings_usd: f64,
}

impl CostInfo {
    fn new(breakdown: MarginBreakdown, embedding_cost_usd: f64, cache_savings_usd: f64) -> Self {
        Self {
            cost_usd: breakdown.cost_usd,
            price_usd: breakdown.price_usd,
            margin_usd: breakdown.margin_usd,
            margin_pct: breakdown.margin_pct,
            embedding_cost_usd,
            cache_savings_usd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingInfo {
    pub category: Category,
    /// Cost tier of the model that produced the answer.
    pub tier: CostTier,
    pub latency_ms: u64,
    /// Provider attempts made; 0 for cache hits.
    pub attempts: usize,
    /// Similarity of the best cached entry, when the cache was consulted.
    pub similarity: Option<f32>,
}

/// Answer returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResponse {
    pub success: bool,
    pub content: String,
    pub model: String,
    /// Provider name, or `cache` for cache hits.
    pub provider: String,
    pub cost: CostInfo,
    pub from_cache: bool,
    /// Entry that served or now stores this answer.
    pub cache_entry_id: Option<String>,
    pub routing: RoutingInfo,
}

/// Orchestrates a single chat request end to end.
pub struct ChatRouter {
    classifier: ComplexityClassifier,
    selector: ModelSelector,
    chain: FallbackChain,
    registry: ProviderRegistry,
    cache: Arc<SemanticCache>,
    ledger: CostLedger,
    settings: RouterSettings,
}

impl ChatRouter {
    pub fn new(
        registry: ProviderRegistry,
        cache: Arc<SemanticCache>,
        ledger: CostLedger,
        settings: RouterSettings,
    ) -> Self {
        let selector = ModelSelector::new();
        let chain = FallbackChain::new(
            settings.fallback_order.clone(),
            settings.provider_timeout,
            selector,
        );
        info!(
            providers = ?registry.ids(),
            cache_enabled = settings.cache_enabled,
            target_margin = settings.target_margin.get(),
            "chat router initialized"
        );
        Self {
            classifier: ComplexityClassifier::new(),
            selector,
            chain,
            registry,
            cache,
            ledger,
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<SemanticCache> {
        &self.cache
    }

    pub fn ledger(&self) -> &CostLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Answer `message` given the prior `history`.
    ///
    /// Only [`FrugalError::AllProvidersFailed`] escapes; cache and ledger
    /// failures are logged and the answer is still returned.
    pub async fn route(
        &self,
        message: &str,
        history: &[ChatMessage],
        options: RouteOptions,
    ) -> Result<RouteResponse, FrugalError> {
        let started = Instant::now();
        let use_cache = self.settings.cache_enabled && !options.skip_cache;

        let mut embedding = None;
        let mut embedding_cost = 0.0;
        let mut similarity = None;
        if use_cache {
            match self.cache.lookup(message).await {
                CacheLookup::Hit {
                    entry,
                    similarity,
                    embedding_cost,
                } => {
                    return Ok(self
                        .serve_cached(entry, similarity, embedding_cost, &options, started)
                        .await);
                }
                CacheLookup::Miss {
                    best_similarity,
                    embedding: vector,
                    embedding_cost: cost,
                } => {
                    metrics::record_cache_miss();
                    embedding = vector;
                    embedding_cost = cost;
                    similarity = Some(best_similarity);
                }
            }
        }

        let classification = self.classifier.classify(message);
        let category = classification.category;
        let primary = self.resolve_model(category, &options);
        debug!(
            %category,
            reason = classification.reason,
            words = classification.word_count,
            model = primary.name,
            "request classified"
        );

        let mut messages = history.to_vec();
        messages.push(ChatMessage::user(message));
        let request = ProviderRequest {
            model: primary.name.to_string(),
            messages,
            system_prompt: options
                .system_prompt
                .clone()
                .or_else(|| self.settings.default_system_prompt.clone()),
        };

        let answered = self
            .chain
            .invoke(&self.registry, primary, category, options.user_tier, request)
            .await
            .inspect_err(|e| warn!(%category, user_id = %options.user_id, error = %e, "routing failed"))?;

        let model = answered.model;
        let provider = answered.provider().to_string();
        let usage = answered.response.usage;
        let provider_cost = calculate_cost(model.name, &usage, &UsageExtras::default());
        let breakdown =
            MarginBreakdown::priced(provider_cost + embedding_cost, self.settings.target_margin);

        let record = CostRecord::provider_answer(
            options.user_id.clone(),
            RequestType::Chat,
            provider.clone(),
            model.name,
            &usage,
            breakdown,
        );
        if let Err(e) = self.ledger.track_request(&record, 0.0).await {
            warn!(record_id = %record.id, error = %e, "failed to record request cost");
        }

        let mut cache_entry_id = None;
        match embedding {
            Some(vector) if use_cache => {
                let new_entry = NewCacheEntry {
                    question: message.to_string(),
                    answer: answered.response.content.clone(),
                    category,
                    model: model.name.to_string(),
                    cost_usd: provider_cost,
                    user_id: Some(options.user_id.clone()),
                    language: options.language.clone(),
                };
                match self.cache.store(new_entry, Some(vector)).await {
                    Ok(outcome) => cache_entry_id = Some(outcome.id),
                    Err(e) => warn!(error = %e, "failed to populate semantic cache"),
                }
            }
            None if use_cache => debug!("no question embedding, answer not cached"),
            _ => {}
        }

        let latency = started.elapsed();
        metrics::record_request(&category.to_string(), "provider");
        metrics::record_cost(&provider, breakdown.cost_usd);
        metrics::record_latency(latency.as_secs_f64());
        info!(
            %category,
            provider = %provider,
            model = model.name,
            attempts = answered.attempts,
            cost_usd = breakdown.cost_usd,
            price_usd = breakdown.price_usd,
            latency_ms = latency.as_millis() as u64,
            "request routed"
        );

        Ok(RouteResponse {
            success: true,
            content: answered.response.content,
            model: model.name.to_string(),
            provider,
            cost: CostInfo::new(breakdown, embedding_cost, 0.0),
            from_cache: false,
            cache_entry_id,
            routing: RoutingInfo {
                category,
                tier: model.tier,
                latency_ms: latency.as_millis() as u64,
                attempts: answered.attempts,
                similarity,
            },
        })
    }

    /// Apply user feedback to a cached answer.
    pub async fn feedback(
        &self,
        entry_id: &str,
        feedback: Feedback,
    ) -> Result<Option<f64>, FrugalError> {
        self.cache.feedback(entry_id, feedback).await
    }

    /// Forced model (request first, then router-wide), when it is in the
    /// catalog and the user's tier may use it; otherwise the selector's choice.
    fn resolve_model(&self, category: Category, options: &RouteOptions) -> &'static ModelDescriptor {
        let forced = options
            .force_model
            .as_deref()
            .or(self.settings.force_model.as_deref());

        if let Some(name) = forced {
            match find_model(name) {
                Some(model) if options.user_tier.allows(model.tier) => {
                    debug!(model = model.name, "using forced model");
                    return model;
                }
                Some(model) => warn!(
                    model = model.name,
                    tier = %model.tier,
                    user_tier = %options.user_tier,
                    "forced model not allowed for user tier, ignoring"
                ),
                None => warn!(model = name, "forced model not in catalog, ignoring"),
            }
        }

        self.selector.select(category, options.user_tier)
    }

    async fn serve_cached(
        &self,
        entry: frugal_cache::CacheEntry,
        similarity: f32,
        embedding_cost: f64,
        options: &RouteOptions,
        started: Instant,
    ) -> RouteResponse {
        metrics::record_cache_hit();

        match self.cache.record_hit(&entry.id).await {
            Ok(true) => {}
            Ok(false) => warn!(entry_id = %entry.id, "cached entry vanished before hit was recorded"),
            Err(e) => warn!(entry_id = %entry.id, error = %e, "failed to record cache hit"),
        }

        let savings = (entry.cost_usd - embedding_cost).max(0.0);
        let record = CostRecord::cache_hit(
            options.user_id.clone(),
            entry.model.clone(),
            entry.id.clone(),
            embedding_cost,
        );
        if let Err(e) = self.ledger.track_request(&record, savings).await {
            warn!(record_id = %record.id, error = %e, "failed to record cache hit cost");
        }

        let tier = match find_model(&entry.model) {
            Some(model) => model.tier,
            None => {
                warn!(
                    entry_id = %entry.id,
                    model = %entry.model,
                    "cached entry model not in catalog, reporting free tier"
                );
                CostTier::Free
            }
        };
        let latency = started.elapsed();
        metrics::record_request(&entry.category.to_string(), "cache");
        metrics::record_cost("cache", embedding_cost);
        metrics::record_latency(latency.as_secs_f64());
        info!(
            entry_id = %entry.id,
            similarity,
            savings_usd = savings,
            latency_ms = latency.as_millis() as u64,
            "served from semantic cache"
        );

        RouteResponse {
            success: true,
            content: entry.answer,
            model: entry.model,
            provider: record.provider,
            cost: CostInfo::new(MarginBreakdown::unbilled(embedding_cost), embedding_cost, savings),
            from_cache: true,
            cache_entry_id: Some(entry.id),
            routing: RoutingInfo {
                category: entry.category,
                tier,
                latency_ms: latency.as_millis() as u64,
                attempts: 0,
                similarity: Some(similarity),
            },
        }
    }
}
