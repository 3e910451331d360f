// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured replies,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use frugal_core::{
    AdapterType, FrugalError, HealthStatus, PluginAdapter, ProviderAdapter, ProviderId,
    ProviderRequest, ProviderResponse, TokenUsage,
};

/// Usage reported for every reply unless overridden.
pub const DEFAULT_USAGE: TokenUsage = TokenUsage {
    input_tokens: 10,
    output_tokens: 20,
};

/// A mock LLM provider bound to one [`ProviderId`].
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. While a failure message is
/// set every call fails with it. Every request is logged for assertions.
pub struct MockProvider {
    id: ProviderId,
    replies: Arc<Mutex<VecDeque<String>>>,
    failure: Mutex<Option<String>>,
    usage: Mutex<TokenUsage>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new(id: ProviderId) -> Self {
        Self::with_queue(id, Arc::new(Mutex::new(VecDeque::new())))
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_responses(id: ProviderId, responses: Vec<String>) -> Self {
        Self::with_queue(id, Arc::new(Mutex::new(VecDeque::from(responses))))
    }

    /// Create a mock provider that fails every call with `message`.
    pub fn failing(id: ProviderId, message: impl Into<String>) -> Self {
        let mut provider = Self::new(id);
        provider.failure = Mutex::new(Some(message.into()));
        provider
    }

    /// Create a mock provider that pops replies from `other`'s queue.
    ///
    /// Failures, usage, delay and the request log stay per provider.
    pub fn sharing_replies(id: ProviderId, other: &MockProvider) -> Self {
        Self::with_queue(id, Arc::clone(&other.replies))
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn with_queue(id: ProviderId, replies: Arc<Mutex<VecDeque<String>>>) -> Self {
        Self {
            id,
            replies,
            failure: Mutex::new(None),
            usage: Mutex::new(DEFAULT_USAGE),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.replies.lock().await.push_back(text);
    }

    /// Fail every subsequent call with `message`, or recover with `None`.
    pub async fn set_failing(&self, message: Option<String>) {
        *self.failure.lock().await = message;
    }

    pub async fn set_usage(&self, usage: TokenUsage) {
        *self.usage.lock().await = usage;
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Pop the next reply, or return the default.
    async fn next_response(&self) -> String {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string())
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, FrugalError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn provider_id(&self) -> ProviderId {
        self.id
    }

    async fn invoke(&self, request: ProviderRequest) -> Result<ProviderResponse, FrugalError> {
        self.requests.lock().await.push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failure.lock().await.clone() {
            return Err(FrugalError::provider(self.id.to_string(), message));
        }

        Ok(ProviderResponse {
            content: self.next_response().await,
            model: request.model,
            usage: *self.usage.lock().await,
        })
    }
}
