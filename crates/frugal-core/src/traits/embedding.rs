// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::FrugalError;
use crate::traits::adapter::PluginAdapter;
use crate::types::EmbeddingOutput;

/// Adapter for turning text into a fixed-length vector.
///
/// The semantic cache is the only consumer. Errors are never fatal there:
/// a failing embedder degrades lookups into misses.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Output dimensionality. Constant for the lifetime of the adapter.
    fn dimensions(&self) -> usize;

    /// Generates an embedding for `text`, reporting what it cost.
    async fn embed(&self, text: &str) -> Result<EmbeddingOutput, FrugalError>;
}
