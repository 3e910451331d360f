// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Frugal routing core.

use thiserror::Error;

/// The primary error type used across all Frugal crates.
#[derive(Debug, Error)]
pub enum FrugalError {
    /// Configuration errors (invalid TOML, out-of-range margin, unknown provider).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A single LLM provider failed to answer.
    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The embedding service failed or is unreachable.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Every provider in the fallback chain failed. Carries the last error.
    #[error("all providers failed after {attempts} attempt(s): {last_error}")]
    AllProvidersFailed { attempts: usize, last_error: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FrugalError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        FrugalError::Provider {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error is the terminal, user-visible routing failure.
    pub fn is_all_providers_failed(&self) -> bool {
        matches!(self, FrugalError::AllProvidersFailed { .. })
    }
}
