// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Frugal routing core.
//!
//! This crate provides the error type, the shared vocabulary (providers,
//! cost tiers, capabilities, categories), and the adapter traits through
//! which the core reaches LLM vendors and the embedding service.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FrugalError;
pub use types::{
    AdapterType, Capability, Category, ChatMessage, CostTier, EmbeddingOutput, HealthStatus,
    ProviderId, ProviderRequest, ProviderResponse, Role, TokenUsage, UserTier,
};

pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frugal_error_has_all_variants() {
        let _config = FrugalError::Config("test".into());
        let _storage = FrugalError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = FrugalError::provider("groq", "rate limited");
        let _embedding = FrugalError::Embedding {
            message: "down".into(),
            source: None,
        };
        let _timeout = FrugalError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = FrugalError::Internal("test".into());
    }

    #[test]
    fn all_providers_failed_message_carries_last_error() {
        let err = FrugalError::AllProvidersFailed {
            attempts: 3,
            last_error: "provider error (openai): 503".into(),
        };
        assert!(err.is_all_providers_failed());
        let msg = err.to_string();
        assert!(msg.contains("3 attempt"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn adapter_type_roundtrip() {
        use std::str::FromStr;
        for variant in [AdapterType::Provider, AdapterType::Embedding] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
    }
}
