// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static registry of providers and their models.
//!
//! Prices are USD per 1M input/output tokens. The catalog has no runtime
//! state; entries are compiled in.

use frugal_core::{Capability, CostTier, ProviderId};

/// One model offered by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub provider: ProviderId,
    /// Model identifier as the provider's API expects it.
    pub name: &'static str,
    pub tier: CostTier,
    pub capabilities: &'static [Capability],
    /// USD per 1M input tokens.
    pub input_price: f64,
    /// USD per 1M output tokens.
    pub output_price: f64,
}

impl ModelDescriptor {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Combined input + output unit price, the selector's sort key.
    pub fn unit_price(&self) -> f64 {
        self.input_price + self.output_price
    }
}

use Capability::*;

const LLAMA_8B: ModelDescriptor = ModelDescriptor {
    provider: ProviderId::Groq,
    name: "llama-3.1-8b-instant",
    tier: CostTier::Free,
    capabilities: &[Chat, Translate, CodeSimple],
    input_price: 0.0,
    output_price: 0.0,
};

static CATALOG: &[ModelDescriptor] = &[
    LLAMA_8B,
    ModelDescriptor {
        provider: ProviderId::Groq,
        name: "llama-3.3-70b-versatile",
        tier: CostTier::Cheap,
        capabilities: &[Chat, Code, Analysis, Translate],
        input_price: 0.59,
        output_price: 0.79,
    },
    ModelDescriptor {
        provider: ProviderId::Gemini,
        name: "gemini-2.0-flash",
        tier: CostTier::Cheap,
        capabilities: &[Chat, Translate, LongContext, Analysis],
        input_price: 0.10,
        output_price: 0.40,
    },
    ModelDescriptor {
        provider: ProviderId::DeepSeek,
        name: "deepseek-chat",
        tier: CostTier::Cheap,
        capabilities: &[Chat, Code, Analysis, LongContext],
        input_price: 0.27,
        output_price: 1.10,
    },
    ModelDescriptor {
        provider: ProviderId::DeepSeek,
        name: "deepseek-reasoner",
        tier: CostTier::Mid,
        capabilities: &[Complex, Analysis, Code],
        input_price: 0.55,
        output_price: 2.19,
    },
    ModelDescriptor {
        provider: ProviderId::Mistral,
        name: "mistral-small-latest",
        tier: CostTier::Cheap,
        capabilities: &[Chat, Translate],
        input_price: 0.20,
        output_price: 0.60,
    },
    ModelDescriptor {
        provider: ProviderId::OpenAi,
        name: "gpt-4o-mini",
        tier: CostTier::Cheap,
        capabilities: &[Chat, Code, Translate],
        input_price: 0.15,
        output_price: 0.60,
    },
    ModelDescriptor {
        provider: ProviderId::OpenAi,
        name: "gpt-4o",
        tier: CostTier::Premium,
        capabilities: &[Chat, Code, Analysis, Complex, Translate, LongContext],
        input_price: 2.50,
        output_price: 10.00,
    },
    ModelDescriptor {
        provider: ProviderId::Anthropic,
        name: "claude-3-5-haiku-latest",
        tier: CostTier::Mid,
        capabilities: &[Chat, Code, Analysis, Translate],
        input_price: 0.80,
        output_price: 4.00,
    },
    ModelDescriptor {
        provider: ProviderId::Anthropic,
        name: "claude-sonnet-4-20250514",
        tier: CostTier::Premium,
        capabilities: &[Chat, Code, Analysis, Complex, LongContext],
        input_price: 3.00,
        output_price: 15.00,
    },
];

static SAFE_DEFAULT: ModelDescriptor = LLAMA_8B;

/// Every model, in catalog order.
pub fn catalog() -> &'static [ModelDescriptor] {
    CATALOG
}

/// Look up a model by name (case-insensitive).
pub fn find_model(name: &str) -> Option<&'static ModelDescriptor> {
    CATALOG.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

/// All models offered by `provider`, in catalog order.
pub fn models_for(provider: ProviderId) -> impl Iterator<Item = &'static ModelDescriptor> {
    CATALOG.iter().filter(move |m| m.provider == provider)
}

/// Cheapest chat-capable model, reachable from every user tier.
pub fn safe_default() -> &'static ModelDescriptor {
    &SAFE_DEFAULT
}

#[cfg(test)]
mod tests {
    use super::*;
    use frugal_core::UserTier;
    use strum::IntoEnumIterator;

    #[test]
    fn every_provider_has_a_model() {
        for provider in ProviderId::iter() {
            assert!(
                models_for(provider).next().is_some(),
                "{provider} has no models"
            );
        }
    }

    #[test]
    fn model_names_are_unique() {
        let mut names: Vec<&str> = catalog().iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog().len());
    }

    #[test]
    fn find_model_ignores_case() {
        let m = find_model("GPT-4o-Mini").unwrap();
        assert_eq!(m.provider, ProviderId::OpenAi);
        assert!(find_model("gpt-5-ultra").is_none());
    }

    #[test]
    fn safe_default_is_cheapest_chat_model_for_everyone() {
        let default = safe_default();
        assert!(default.has_capability(Capability::Chat));
        for tier in UserTier::iter() {
            assert!(tier.allows(default.tier));
        }
        let cheapest = catalog()
            .iter()
            .filter(|m| m.has_capability(Capability::Chat))
            .map(|m| m.unit_price())
            .fold(f64::INFINITY, f64::min);
        assert_eq!(default.unit_price(), cheapest);
        assert_eq!(find_model(default.name), Some(default));
    }

    #[test]
    fn premium_models_exist_for_complex_work() {
        assert!(
            catalog()
                .iter()
                .any(|m| m.tier == CostTier::Premium && m.has_capability(Capability::Complex))
        );
    }
}
