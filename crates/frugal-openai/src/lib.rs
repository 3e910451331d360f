// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible adapters for the Frugal routing core.
//!
//! Every supported vendor exposes an OpenAI-style `/chat/completions`
//! endpoint, so one [`OpenAiCompatProvider`] per [`ProviderId`] covers them
//! all. [`OpenAiEmbedder`] wraps `/embeddings` for the semantic cache.

pub mod client;
pub mod types;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use frugal_config::model::{EmbeddingConfig, ProviderEndpointConfig};
use frugal_core::{
    AdapterType, EmbeddingAdapter, EmbeddingOutput, FrugalError, HealthStatus, PluginAdapter,
    ProviderAdapter, ProviderId, ProviderRequest, ProviderResponse, Role, TokenUsage,
};
use tracing::{debug, info};

use crate::client::{HttpFailure, OpenAiClient};
use crate::types::{
    ApiMessage, ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest,
    EmbeddingResponse,
};

/// Chat completions adapter for one vendor.
pub struct OpenAiCompatProvider {
    id: ProviderId,
    client: OpenAiClient,
}

impl OpenAiCompatProvider {
    pub fn new(id: ProviderId, client: OpenAiClient) -> Self {
        Self { id, client }
    }

    /// Build from a `[[providers]]` entry. The HTTP timeout is a backstop;
    /// the router enforces its own per-call timeout.
    pub fn from_config(endpoint: &ProviderEndpointConfig, timeout: Duration) -> Result<Self, FrugalError> {
        let id = ProviderId::from_str(&endpoint.id)
            .map_err(|_| FrugalError::Config(format!("unknown provider `{}`", endpoint.id)))?;
        let api_key = endpoint.resolve_api_key();
        let client = OpenAiClient::new(&endpoint.base_url, api_key.as_deref(), timeout)
            .map_err(|f| provider_error(id, f))?;
        info!(provider = %id, base_url = %endpoint.base_url, has_key = api_key.is_some(), "provider configured");
        Ok(Self::new(id, client))
    }

    fn to_request(request: &ProviderRequest) -> ChatCompletionRequest {
        let system = request.system_prompt.iter().map(|prompt| ApiMessage {
            role: Role::System.to_string(),
            content: prompt.clone(),
        });
        let turns = request.messages.iter().map(|m| ApiMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        });
        ChatCompletionRequest {
            model: request.model.clone(),
            messages: system.chain(turns).collect(),
            stream: false,
        }
    }
}

fn provider_error(id: ProviderId, failure: HttpFailure) -> FrugalError {
    FrugalError::Provider {
        provider: id.to_string(),
        message: failure.message,
        source: failure.source,
    }
}

#[async_trait]
impl PluginAdapter for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
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
impl ProviderAdapter for OpenAiCompatProvider {
    fn provider_id(&self) -> ProviderId {
        self.id
    }

    async fn invoke(&self, request: ProviderRequest) -> Result<ProviderResponse, FrugalError> {
        let body = Self::to_request(&request);
        let response: ChatCompletionResponse = self
            .client
            .post_json("/chat/completions", &body)
            .await
            .map_err(|f| provider_error(self.id, f))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| FrugalError::provider(self.id.to_string(), "response contained no content"))?;
        let usage = response.usage.unwrap_or_default();
        debug!(
            provider = %self.id,
            model = %request.model,
            input_tokens = usage.prompt_tokens,
            output_tokens = usage.completion_tokens,
            "completion received"
        );

        Ok(ProviderResponse {
            content,
            model: response.model.unwrap_or(request.model),
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

/// Embedding adapter over an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
    dimensions: usize,
    price_per_mtok: f64,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient, model: String, dimensions: usize, price_per_mtok: f64) -> Self {
        Self {
            client,
            model,
            dimensions,
            price_per_mtok,
        }
    }

    pub fn from_config(config: &EmbeddingConfig, dimensions: usize) -> Result<Self, FrugalError> {
        let api_key = config.resolve_api_key();
        let client = OpenAiClient::new(&config.base_url, api_key.as_deref(), Duration::from_secs(30))
            .map_err(embedding_error)?;
        Ok(Self::new(client, config.model.clone(), dimensions, config.price_per_mtok))
    }
}

fn embedding_error(failure: HttpFailure) -> FrugalError {
    FrugalError::Embedding {
        message: failure.message,
        source: failure.source,
    }
}

/// Rough token estimate for vendors that omit usage: four characters per token.
fn estimate_tokens(text: &str) -> u32 {
    u32::try_from(text.chars().count().div_ceil(4)).unwrap_or(u32::MAX)
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, FrugalError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingOutput, FrugalError> {
        let body = EmbeddingRequest {
            model: self.model.clone(),
            input: text.to_string(),
        };
        let response: EmbeddingResponse = self
            .client
            .post_json("/embeddings", &body)
            .await
            .map_err(embedding_error)?;

        let vector = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| FrugalError::Embedding {
                message: "response contained no embedding".into(),
                source: None,
            })?;
        let tokens = response
            .usage
            .map(|u| u.prompt_tokens)
            .unwrap_or_else(|| estimate_tokens(text));

        Ok(EmbeddingOutput {
            vector,
            cost_usd: f64::from(tokens) / 1_000_000.0 * self.price_per_mtok,
        })
    }
}
