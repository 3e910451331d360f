// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding adapter.
//!
//! Each lowercase alphanumeric word is hashed (FNV-1a) into one of
//! `dimensions` buckets and counted. Identical text always yields an
//! identical vector; texts sharing no words are orthogonal unless their
//! words collide in a bucket.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use frugal_core::{
    AdapterType, EmbeddingAdapter, EmbeddingOutput, FrugalError, HealthStatus, PluginAdapter,
};

/// Cost charged per call unless overridden.
pub const DEFAULT_EMBEDDING_COST: f64 = 0.000_002;

pub struct MockEmbedder {
    dimensions: usize,
    cost_per_call: f64,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            cost_per_call: DEFAULT_EMBEDDING_COST,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_cost(mut self, cost_per_call: f64) -> Self {
        self.cost_per_call = cost_per_call;
        self
    }

    pub fn cost_per_call(&self) -> f64 {
        self.cost_per_call
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The vector [`embed`](EmbeddingAdapter::embed) returns for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        if self.dimensions == 0 {
            return vector;
        }
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = (fnv1a(&word.to_lowercase()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        vector
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, FrugalError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("embedding disabled".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingOutput, FrugalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FrugalError::Embedding {
                message: "mock embedder is failing".into(),
                source: None,
            });
        }
        Ok(EmbeddingOutput {
            vector: self.vector_for(text),
            cost_usd: self.cost_per_call,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_text_identical_vector() {
        let embedder = MockEmbedder::new(64);
        let a = embedder.embed("What is your refund policy?").await.unwrap();
        let b = embedder.embed("what is your REFUND policy").await.unwrap();
        assert_eq!(a.vector, b.vector);
        assert_eq!(a.vector.len(), 64);
        assert_eq!(a.cost_usd, DEFAULT_EMBEDDING_COST);
        assert_eq!(embedder.call_count(), 2);
    }

    #[tokio::test]
    async fn empty_text_is_zero_vector() {
        let embedder = MockEmbedder::new(8);
        let out = embedder.embed("   ").await.unwrap();
        assert!(out.vector.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn failure_toggle() {
        let embedder = MockEmbedder::new(8).with_cost(0.5);
        embedder.set_failing(true);
        assert!(embedder.embed("hi").await.is_err());
        assert!(matches!(
            embedder.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        embedder.set_failing(false);
        assert_eq!(embedder.embed("hi").await.unwrap().cost_usd, 0.5);
        assert_eq!(embedder.call_count(), 2);
    }
}
