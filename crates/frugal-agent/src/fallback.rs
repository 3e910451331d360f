// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider fallback chain.
//!
//! The selected model is tried first. On failure each remaining provider in
//! the configured order is tried with the closest equivalent model it
//! offers: same cost tier when possible, otherwise the cheapest model the
//! user may reach that still fits the category. A timeout counts as a
//! failure. When every attempt fails, the last error is surfaced inside
//! [`FrugalError::AllProvidersFailed`].

use std::time::Duration;

use frugal_core::{
    Category, FrugalError, ProviderId, ProviderRequest, ProviderResponse, UserTier,
};
use frugal_router::{ModelDescriptor, ModelSelector};
use tracing::{debug, info, warn};

use crate::metrics;
use crate::registry::ProviderRegistry;

/// Default provider order, cheapest vendors first.
pub const DEFAULT_FALLBACK_ORDER: [ProviderId; 6] = [
    ProviderId::Groq,
    ProviderId::Gemini,
    ProviderId::DeepSeek,
    ProviderId::Mistral,
    ProviderId::OpenAi,
    ProviderId::Anthropic,
];

/// A successful answer and which attempt produced it.
#[derive(Debug, Clone)]
pub struct Answered {
    pub response: ProviderResponse,
    pub model: &'static ModelDescriptor,
    /// Attempts made, including the successful one.
    pub attempts: usize,
}

impl Answered {
    pub fn provider(&self) -> ProviderId {
        self.model.provider
    }
}

/// Ordered failover across providers with a per-call timeout.
#[derive(Debug, Clone)]
pub struct FallbackChain {
    order: Vec<ProviderId>,
    timeout: Duration,
    selector: ModelSelector,
}

impl FallbackChain {
    pub fn new(order: Vec<ProviderId>, timeout: Duration, selector: ModelSelector) -> Self {
        Self {
            order,
            timeout,
            selector,
        }
    }

    pub fn order(&self) -> &[ProviderId] {
        &self.order
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Models to try, `primary` first, at most one per provider.
    pub fn plan(
        &self,
        primary: &'static ModelDescriptor,
        category: Category,
        user_tier: UserTier,
    ) -> Vec<&'static ModelDescriptor> {
        let mut plan = vec![primary];
        for &provider in &self.order {
            if provider == primary.provider {
                continue;
            }
            match self
                .selector
                .fallback_on(provider, primary, category, user_tier)
            {
                Some(model) => plan.push(model),
                None => debug!(%provider, %category, "provider has no suitable fallback model"),
            }
        }
        plan
    }

    /// Run `request` through the plan until one provider answers.
    ///
    /// `request.model` is overwritten per attempt.
    pub async fn invoke(
        &self,
        registry: &ProviderRegistry,
        primary: &'static ModelDescriptor,
        category: Category,
        user_tier: UserTier,
        request: ProviderRequest,
    ) -> Result<Answered, FrugalError> {
        let mut attempts = 0;
        let mut last_error: Option<FrugalError> = None;

        for model in self.plan(primary, category, user_tier) {
            let Some(adapter) = registry.get(model.provider) else {
                debug!(provider = %model.provider, model = model.name, "provider not registered, skipping");
                continue;
            };

            attempts += 1;
            let mut attempt = request.clone();
            attempt.model = model.name.to_string();

            let result = match tokio::time::timeout(self.timeout, adapter.invoke(attempt)).await {
                Ok(Ok(response)) if response.content.trim().is_empty() => Err(
                    FrugalError::provider(model.provider.to_string(), "empty response"),
                ),
                Ok(result) => result,
                Err(_) => Err(FrugalError::Timeout {
                    duration: self.timeout,
                }),
            };

            match result {
                Ok(response) => {
                    if attempts > 1 {
                        info!(
                            provider = %model.provider,
                            model = model.name,
                            attempts,
                            "fallback provider answered"
                        );
                    }
                    return Ok(Answered {
                        response,
                        model,
                        attempts,
                    });
                }
                Err(e) => {
                    warn!(
                        provider = %model.provider,
                        model = model.name,
                        attempt = attempts,
                        error = %e,
                        "provider attempt failed"
                    );
                    metrics::record_provider_failure(&model.provider.to_string());
                    last_error = Some(e);
                }
            }
        }

        let last_error = match last_error {
            Some(e) => e.to_string(),
            None => format!(
                "no registered provider can serve category `{category}` for tier `{user_tier}`"
            ),
        };
        Err(FrugalError::AllProvidersFailed {
            attempts,
            last_error,
        })
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::new(
            DEFAULT_FALLBACK_ORDER.to_vec(),
            Duration::from_secs(30),
            ModelSelector::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use frugal_core::ChatMessage;
    use frugal_router::find_model;
    use frugal_test_utils::MockProvider;

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: String::new(),
            messages: vec![ChatMessage::user("hello")],
            system_prompt: None,
        }
    }

    fn model(name: &str) -> &'static ModelDescriptor {
        find_model(name).unwrap()
    }

    #[test]
    fn plan_starts_with_primary_and_skips_its_provider() {
        let chain = FallbackChain::default();
        let primary = model("llama-3.1-8b-instant");
        let plan = chain.plan(primary, Category::Simple, UserTier::Free);

        assert_eq!(plan[0].name, "llama-3.1-8b-instant");
        assert_eq!(
            plan.iter().filter(|m| m.provider == ProviderId::Groq).count(),
            1
        );
        assert!(plan.iter().all(|m| UserTier::Free.allows(m.tier)));
    }

    #[test]
    fn plan_for_code_only_contains_code_models() {
        let chain = FallbackChain::default();
        let primary = model("gpt-4o-mini");
        let plan = chain.plan(primary, Category::Code, UserTier::Free);
        assert!(plan.len() > 1);
        assert!(
            plan.iter()
                .all(|m| m.has_capability(frugal_core::Capability::Code))
        );
    }

    #[tokio::test]
    async fn first_provider_answers() {
        let mut registry = ProviderRegistry::new();
        let groq = Arc::new(MockProvider::with_responses(
            ProviderId::Groq,
            vec!["hi there".into()],
        ));
        registry.register(groq.clone());

        let answered = FallbackChain::default()
            .invoke(
                &registry,
                model("llama-3.1-8b-instant"),
                Category::Simple,
                UserTier::Free,
                request(),
            )
            .await
            .unwrap();

        assert_eq!(answered.response.content, "hi there");
        assert_eq!(answered.attempts, 1);
        assert_eq!(answered.provider(), ProviderId::Groq);
        assert_eq!(groq.requests().await[0].model, "llama-3.1-8b-instant");
    }

    #[tokio::test]
    async fn falls_back_to_next_provider_in_order() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProvider::failing(ProviderId::Groq, "503")));
        let gemini = Arc::new(MockProvider::with_responses(
            ProviderId::Gemini,
            vec!["from gemini".into()],
        ));
        registry.register(gemini.clone());

        let answered = FallbackChain::default()
            .invoke(
                &registry,
                model("llama-3.1-8b-instant"),
                Category::Simple,
                UserTier::Free,
                request(),
            )
            .await
            .unwrap();

        assert_eq!(answered.response.content, "from gemini");
        assert_eq!(answered.provider(), ProviderId::Gemini);
        assert_eq!(answered.attempts, 2);
        assert_eq!(gemini.requests().await[0].model, "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn timeout_counts_as_failure() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(
            MockProvider::new(ProviderId::Groq).with_delay(Duration::from_millis(500)),
        ));
        registry.register(Arc::new(MockProvider::with_responses(
            ProviderId::Gemini,
            vec!["fast".into()],
        )));

        let chain = FallbackChain::new(
            DEFAULT_FALLBACK_ORDER.to_vec(),
            Duration::from_millis(50),
            ModelSelector::new(),
        );
        let answered = chain
            .invoke(
                &registry,
                model("llama-3.1-8b-instant"),
                Category::Simple,
                UserTier::Free,
                request(),
            )
            .await
            .unwrap();
        assert_eq!(answered.response.content, "fast");
        assert_eq!(answered.attempts, 2);
    }

    #[tokio::test]
    async fn empty_answer_is_a_failure() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProvider::with_responses(
            ProviderId::Groq,
            vec!["   ".into()],
        )));
        registry.register(Arc::new(MockProvider::with_responses(
            ProviderId::Gemini,
            vec!["real answer".into()],
        )));

        let answered = FallbackChain::default()
            .invoke(
                &registry,
                model("llama-3.1-8b-instant"),
                Category::Simple,
                UserTier::Free,
                request(),
            )
            .await
            .unwrap();
        assert_eq!(answered.response.content, "real answer");
    }

    #[tokio::test]
    async fn exhaustion_surfaces_last_error() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProvider::failing(ProviderId::Groq, "rate limited")));
        registry.register(Arc::new(MockProvider::failing(ProviderId::OpenAi, "overloaded")));

        let err = FallbackChain::default()
            .invoke(
                &registry,
                model("llama-3.1-8b-instant"),
                Category::Simple,
                UserTier::Free,
                request(),
            )
            .await
            .unwrap_err();

        match err {
            FrugalError::AllProvidersFailed {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("overloaded"), "{last_error}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_registry_fails_without_attempts() {
        let err = FallbackChain::default()
            .invoke(
                &ProviderRegistry::new(),
                model("llama-3.1-8b-instant"),
                Category::Simple,
                UserTier::Free,
                request(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FrugalError::AllProvidersFailed { attempts: 0, .. }
        ));
    }
}
