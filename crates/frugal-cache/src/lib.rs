// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic cache for previously answered questions.
//!
//! Questions are embedded and compared by cosine similarity against a
//! bounded in-memory index. Every entry is persisted to SQLite; the index
//! holds the best-ranked subset and is rebuilt from the store on startup.

pub mod cache;
pub mod store;
pub mod types;

pub use cache::{CacheLookup, CacheSettings, CacheStats, SemanticCache, StoreOutcome};
pub use store::CacheStore;
pub use types::{
    CacheEntry, CleanupPolicy, Feedback, NewCacheEntry, blob_to_vec, cosine_similarity,
    vec_to_blob,
};
