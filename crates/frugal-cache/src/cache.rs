// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded in-memory similarity index over the durable cache store.

use std::sync::Arc;

use frugal_core::{EmbeddingAdapter, FrugalError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::store::CacheStore;
use crate::types::{CacheEntry, CleanupPolicy, Feedback, NewCacheEntry, cosine_similarity, now_timestamp};

/// Tunables for the semantic cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheSettings {
    /// Minimum cosine similarity for a hit.
    pub similarity_threshold: f32,
    /// Maximum number of entries held in memory.
    pub capacity: usize,
    /// Expected embedding length; other lengths are never indexed.
    pub dimensions: usize,
    /// Quality change applied per feedback event.
    pub feedback_delta: f64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.92,
            capacity: 10_000,
            dimensions: 1536,
            feedback_delta: 0.1,
        }
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Hit {
        entry: CacheEntry,
        similarity: f32,
        embedding_cost: f64,
    },
    Miss {
        /// Best similarity seen, 0 when nothing was comparable.
        best_similarity: f32,
        /// The question's embedding, reusable by [`SemanticCache::store`].
        /// `None` when the embedding service failed.
        embedding: Option<Vec<f32>>,
        embedding_cost: f64,
    },
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit { .. })
    }

    /// What embedding the question cost, charged on hits and misses alike.
    pub fn embedding_cost(&self) -> f64 {
        match self {
            CacheLookup::Hit { embedding_cost, .. } | CacheLookup::Miss { embedding_cost, .. } => {
                *embedding_cost
            }
        }
    }
}

/// Result of storing an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOutcome {
    pub id: String,
    /// Embedding cost incurred by this call; 0 when an embedding was supplied.
    pub embedding_cost: f64,
    /// Whether the entry made it into the in-memory index.
    pub indexed: bool,
}

/// Index size snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub indexed: usize,
    pub capacity: usize,
    pub dimensions: usize,
    pub similarity_threshold: f32,
}

/// Semantic cache: embedding lookup over a bounded index, backed by SQLite.
pub struct SemanticCache {
    store: CacheStore,
    embedder: Arc<dyn EmbeddingAdapter>,
    settings: CacheSettings,
    index: RwLock<Vec<CacheEntry>>,
}

impl SemanticCache {
    /// Create an empty cache. Call [`load`](Self::load) to populate the index.
    pub fn new(store: CacheStore, embedder: Arc<dyn EmbeddingAdapter>, settings: CacheSettings) -> Self {
        Self {
            store,
            embedder,
            settings,
            index: RwLock::new(Vec::new()),
        }
    }

    /// The durable store behind this cache.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Rebuild the index from the store: most used, then best quality,
    /// truncated to capacity. Returns the number of indexed entries.
    pub async fn load(&self) -> Result<usize, FrugalError> {
        let entries: Vec<CacheEntry> = self
            .store
            .load_top(self.settings.capacity)
            .await?
            .into_iter()
            .filter(|e| e.embedding.len() == self.settings.dimensions)
            .collect();
        let count = entries.len();
        *self.index.write().await = entries;
        info!(entries = count, capacity = self.settings.capacity, "semantic cache loaded");
        Ok(count)
    }

    /// Embed `question` and scan the index for the most similar entry.
    ///
    /// An embedding failure is a guaranteed miss with zero cost.
    pub async fn lookup(&self, question: &str) -> CacheLookup {
        let output = match self.embedder.embed(question).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "embedding failed, treating as cache miss");
                return CacheLookup::Miss {
                    best_similarity: 0.0,
                    embedding: None,
                    embedding_cost: 0.0,
                };
            }
        };

        let best = {
            let index = self.index.read().await;
            index
                .iter()
                .map(|entry| (cosine_similarity(&output.vector, &entry.embedding), entry))
                .max_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(similarity, entry)| (similarity, entry.clone()))
        };

        match best {
            Some((similarity, entry)) if similarity >= self.settings.similarity_threshold => {
                debug!(entry_id = %entry.id, similarity, "cache hit");
                CacheLookup::Hit {
                    entry,
                    similarity,
                    embedding_cost: output.cost_usd,
                }
            }
            other => {
                let best_similarity = other.map(|(s, _)| s).unwrap_or(0.0).max(0.0);
                debug!(best_similarity, "cache miss");
                CacheLookup::Miss {
                    best_similarity,
                    embedding: Some(output.vector),
                    embedding_cost: output.cost_usd,
                }
            }
        }
    }

    /// Persist a new answer and add it to the index while capacity remains.
    ///
    /// `embedding` is reused when given (typically from a preceding miss);
    /// otherwise the question is embedded here.
    pub async fn store(
        &self,
        new_entry: NewCacheEntry,
        embedding: Option<Vec<f32>>,
    ) -> Result<StoreOutcome, FrugalError> {
        let (vector, embedding_cost) = match embedding {
            Some(vector) => (vector, 0.0),
            None => {
                let output = self.embedder.embed(&new_entry.question).await?;
                (output.vector, output.cost_usd)
            }
        };

        let entry = new_entry.into_entry(vector);
        self.store.insert(&entry).await?;
        let id = entry.id.clone();

        let indexed = if entry.embedding.len() != self.settings.dimensions {
            warn!(
                entry_id = %id,
                got = entry.embedding.len(),
                expected = self.settings.dimensions,
                "embedding length mismatch, entry persisted but not indexed"
            );
            false
        } else {
            let mut index = self.index.write().await;
            if index.len() < self.settings.capacity {
                index.push(entry);
                true
            } else {
                debug!(entry_id = %id, "cache index full, entry persisted only");
                false
            }
        };

        Ok(StoreOutcome {
            id,
            embedding_cost,
            indexed,
        })
    }

    /// Count a reuse of `entry_id`. Returns false if the entry is unknown.
    pub async fn record_hit(&self, entry_id: &str) -> Result<bool, FrugalError> {
        let now = now_timestamp();
        let found = self.store.record_hit(entry_id, &now).await?;
        if found
            && let Some(entry) = self.index.write().await.iter_mut().find(|e| e.id == entry_id)
        {
            entry.use_count = entry.use_count.saturating_add(1);
            entry.last_used_at = now;
        }
        Ok(found)
    }

    /// Apply user feedback. Returns the new quality score, `None` for an unknown entry.
    pub async fn feedback(&self, entry_id: &str, feedback: Feedback) -> Result<Option<f64>, FrugalError> {
        let delta = match feedback {
            Feedback::Positive => self.settings.feedback_delta,
            Feedback::Negative => -self.settings.feedback_delta,
        };
        let score = self.store.adjust_quality(entry_id, delta).await?;
        if let Some(score) = score
            && let Some(entry) = self.index.write().await.iter_mut().find(|e| e.id == entry_id)
        {
            entry.quality_score = score;
        }
        debug!(entry_id, %feedback, ?score, "feedback applied");
        Ok(score)
    }

    /// Delete stale entries from the store, then reload the index.
    pub async fn cleanup(&self, policy: CleanupPolicy) -> Result<usize, FrugalError> {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(policy.min_age_days));
        let cutoff = cutoff.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let removed = self
            .store
            .delete_stale(policy.min_quality, policy.max_uses, &cutoff)
            .await?;
        info!(removed, "cache cleanup complete");
        self.load().await?;
        Ok(removed)
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            indexed: self.index.read().await.len(),
            capacity: self.settings.capacity,
            dimensions: self.settings.dimensions,
            similarity_threshold: self.settings.similarity_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use frugal_core::{AdapterType, Category, EmbeddingOutput, HealthStatus, PluginAdapter};
    use frugal_storage::Database;

    const DIMS: usize = 16;

    /// Hashes words into buckets so identical text yields identical vectors.
    struct BagOfWords {
        failing: AtomicBool,
    }

    #[async_trait]
    impl PluginAdapter for BagOfWords {
        fn name(&self) -> &str {
            "bag-of-words"
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
    impl EmbeddingAdapter for BagOfWords {
        fn dimensions(&self) -> usize {
            DIMS
        }
        async fn embed(&self, text: &str) -> Result<EmbeddingOutput, FrugalError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(FrugalError::Embedding {
                    message: "service down".into(),
                    source: None,
                });
            }
            let mut vector = vec![0.0_f32; DIMS];
            for word in text.to_lowercase().split_whitespace() {
                let bucket = word.bytes().fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
                vector[bucket % DIMS] += 1.0;
            }
            Ok(EmbeddingOutput {
                vector,
                cost_usd: 0.00001,
            })
        }
    }

    async fn test_cache(capacity: usize) -> (SemanticCache, Arc<BagOfWords>) {
        let db = Database::open_in_memory().await.unwrap();
        let embedder = Arc::new(BagOfWords {
            failing: AtomicBool::new(false),
        });
        let settings = CacheSettings {
            capacity,
            dimensions: DIMS,
            ..CacheSettings::default()
        };
        let cache = SemanticCache::new(CacheStore::new(db), embedder.clone(), settings);
        (cache, embedder)
    }

    fn new_entry(question: &str, answer: &str) -> NewCacheEntry {
        NewCacheEntry {
            question: question.to_string(),
            answer: answer.to_string(),
            category: Category::Simple,
            model: "llama-3.1-8b-instant".to_string(),
            cost_usd: 0.0004,
            user_id: Some("u1".to_string()),
            language: Some("en".to_string()),
        }
    }

    #[tokio::test]
    async fn refund_policy_miss_then_hit() {
        let (cache, _) = test_cache(100).await;
        let question = "What is your refund policy?";
        let answer = "Refunds are available within 30 days of purchase.";

        let first = cache.lookup(question).await;
        let CacheLookup::Miss { embedding, .. } = first else {
            panic!("empty cache must miss");
        };
        let outcome = cache
            .store(new_entry(question, answer), embedding)
            .await
            .unwrap();
        assert!(outcome.indexed);
        assert_eq!(outcome.embedding_cost, 0.0);

        match cache.lookup(question).await {
            CacheLookup::Hit {
                entry,
                similarity,
                embedding_cost,
            } => {
                assert_eq!(entry.id, outcome.id);
                assert_eq!(entry.answer, answer);
                assert!((similarity - 1.0).abs() < 1e-6);
                assert_eq!(embedding_cost, 0.00001);
            }
            other => panic!("expected hit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dissimilar_question_misses_with_best_similarity() {
        let (cache, _) = test_cache(100).await;
        cache
            .store(new_entry("how do I reset my password", "Use the link."), None)
            .await
            .unwrap();

        match cache.lookup("what are your opening hours on sunday").await {
            CacheLookup::Miss {
                best_similarity,
                embedding,
                ..
            } => {
                assert!(best_similarity < 0.92);
                assert_eq!(embedding.map(|v| v.len()), Some(DIMS));
            }
            other => panic!("expected miss, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn embedding_failure_is_free_miss() {
        let (cache, embedder) = test_cache(100).await;
        embedder.failing.store(true, Ordering::SeqCst);
        let lookup = cache.lookup("anything").await;
        assert!(!lookup.is_hit());
        assert_eq!(lookup.embedding_cost(), 0.0);
    }

    #[tokio::test]
    async fn store_embeds_when_no_vector_given() {
        let (cache, _) = test_cache(100).await;
        let outcome = cache.store(new_entry("q", "a"), None).await.unwrap();
        assert_eq!(outcome.embedding_cost, 0.00001);
    }

    #[tokio::test]
    async fn mismatched_embedding_is_persisted_not_indexed() {
        let (cache, _) = test_cache(100).await;
        let outcome = cache
            .store(new_entry("q", "a"), Some(vec![1.0, 2.0]))
            .await
            .unwrap();
        assert!(!outcome.indexed);
        assert_eq!(cache.stats().await.indexed, 0);
        assert_eq!(cache.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn full_index_skips_insertion() {
        let (cache, _) = test_cache(1).await;
        assert!(cache.store(new_entry("first", "a"), None).await.unwrap().indexed);
        assert!(!cache.store(new_entry("second", "b"), None).await.unwrap().indexed);
        assert_eq!(cache.stats().await.indexed, 1);
        assert_eq!(cache.store().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn concurrent_stores_never_exceed_capacity() {
        let (cache, _) = test_cache(5).await;
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .store(new_entry(&format!("question number {i}"), "a"), None)
                        .await
                        .unwrap()
                })
            })
            .collect();
        let mut indexed = 0;
        for handle in handles {
            if handle.await.unwrap().indexed {
                indexed += 1;
            }
        }

        assert_eq!(indexed, 5);
        assert_eq!(cache.stats().await.indexed, 5);
        assert_eq!(cache.store().count().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn hits_and_feedback_update_index_and_store() {
        let (cache, _) = test_cache(10).await;
        let outcome = cache.store(new_entry("q", "a"), None).await.unwrap();

        assert!(cache.record_hit(&outcome.id).await.unwrap());
        assert!(!cache.record_hit("missing").await.unwrap());

        let score = cache.feedback(&outcome.id, Feedback::Positive).await.unwrap();
        assert!((score.unwrap() - 0.6).abs() < 1e-9);
        let score = cache.feedback(&outcome.id, Feedback::Negative).await.unwrap();
        assert!((score.unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(cache.feedback("missing", Feedback::Positive).await.unwrap(), None);

        let stored = cache.store().get_by_id(&outcome.id).await.unwrap().unwrap();
        assert_eq!(stored.use_count, 1);
        assert!((stored.quality_score - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn feedback_clamps_at_bounds() {
        let (cache, _) = test_cache(10).await;
        let outcome = cache.store(new_entry("q", "a"), None).await.unwrap();
        let mut last = None;
        for _ in 0..10 {
            last = cache.feedback(&outcome.id, Feedback::Positive).await.unwrap();
        }
        assert_eq!(last, Some(1.0));
    }

    #[tokio::test]
    async fn reload_prefers_most_used_entries() {
        let (cache, _) = test_cache(1).await;
        let first = cache.store(new_entry("first", "a"), None).await.unwrap();
        let second = cache.store(new_entry("second", "b"), None).await.unwrap();
        cache.record_hit(&second.id).await.unwrap();
        assert!(first.indexed && !second.indexed);

        assert_eq!(cache.load().await.unwrap(), 1);
        match cache.lookup("second").await {
            CacheLookup::Hit { entry, .. } => assert_eq!(entry.id, second.id),
            other => panic!("expected hit on reloaded entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cleanup_keeps_recent_entries() {
        let (cache, _) = test_cache(10).await;
        let outcome = cache.store(new_entry("q", "a"), None).await.unwrap();
        for _ in 0..5 {
            cache.feedback(&outcome.id, Feedback::Negative).await.unwrap();
        }
        let removed = cache.cleanup(CleanupPolicy::default()).await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(cache.stats().await.indexed, 1);
    }
}
