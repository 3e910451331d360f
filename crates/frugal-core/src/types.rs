// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the router, cache, ledger, and adapters.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external collaborator an adapter wraps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
}

/// Known LLM vendors. Dispatch is keyed by this enum, never by raw strings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Groq,
    Gemini,
    DeepSeek,
    Mistral,
    OpenAi,
    Anthropic,
}

/// Coarse pricing class used to gate model access by subscription.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    Free,
    Cheap,
    Mid,
    Premium,
}

/// What kind of task a model is fit for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Chat,
    Code,
    CodeSimple,
    Analysis,
    Complex,
    Translate,
    LongContext,
}

/// Subscription tier of the requesting user.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl UserTier {
    /// Cost tiers this subscription may be routed to.
    pub fn allowed_cost_tiers(&self) -> &'static [CostTier] {
        match self {
            UserTier::Free => &[CostTier::Free, CostTier::Cheap, CostTier::Mid],
            UserTier::Pro | UserTier::Enterprise => &[
                CostTier::Free,
                CostTier::Cheap,
                CostTier::Mid,
                CostTier::Premium,
            ],
        }
    }

    /// Whether a model of `tier` may serve this user.
    pub fn allows(&self, tier: CostTier) -> bool {
        self.allowed_cost_tiers().contains(&tier)
    }
}

/// Complexity category assigned to an inbound message.
///
/// Variant order is the classifier's priority order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Website,
    Code,
    Complex,
    Analysis,
    Translate,
    Simple,
}

impl Category {
    /// Capability a model must offer to serve this category.
    pub fn required_capability(&self) -> Capability {
        match self {
            Category::Website | Category::Code => Capability::Code,
            Category::Complex => Capability::Complex,
            Category::Analysis => Capability::Analysis,
            Category::Translate => Capability::Translate,
            Category::Simple => Capability::Chat,
        }
    }

    /// Strict categories never fall back to a chat-only model.
    pub fn is_strict(&self) -> bool {
        matches!(
            self,
            Category::Code | Category::Website | Category::Analysis | Category::Complex
        )
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single conversation turn passed to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Token usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completion request to a single provider/model.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Model identifier as the provider knows it.
    pub model: String,
    /// Prior turns followed by the new user message.
    pub messages: Vec<ChatMessage>,
    /// Optional system prompt prepended by the adapter.
    pub system_prompt: Option<String>,
}

/// A completed provider answer.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// Output of the embedding service for a single text.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutput {
    pub vector: Vec<f32>,
    /// What generating this vector cost, in USD.
    pub cost_usd: f64,
}
