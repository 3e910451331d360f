// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache entry types and vector helpers.

use chrono::{SecondsFormat, Utc};
use frugal_core::Category;
use strum::{Display, EnumString};

/// Quality score given to a freshly stored answer.
pub const INITIAL_QUALITY: f64 = 0.5;

/// A cached question/answer pair.
///
/// `question`, `answer` and `embedding` never change after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub embedding: Vec<f32>,
    pub category: Category,
    /// Model that produced the answer.
    pub model: String,
    /// What the original answer cost, in USD.
    pub cost_usd: f64,
    pub user_id: Option<String>,
    pub language: Option<String>,
    /// In [0, 1].
    pub quality_score: f64,
    pub use_count: u32,
    /// ISO 8601 timestamp.
    pub created_at: String,
    /// ISO 8601 timestamp.
    pub last_used_at: String,
}

/// What the caller supplies when storing a new answer.
#[derive(Debug, Clone)]
pub struct NewCacheEntry {
    pub question: String,
    pub answer: String,
    pub category: Category,
    pub model: String,
    pub cost_usd: f64,
    pub user_id: Option<String>,
    pub language: Option<String>,
}

impl NewCacheEntry {
    pub(crate) fn into_entry(self, embedding: Vec<f32>) -> CacheEntry {
        let now = now_timestamp();
        CacheEntry {
            id: uuid::Uuid::new_v4().to_string(),
            question: self.question,
            answer: self.answer,
            embedding,
            category: self.category,
            model: self.model,
            cost_usd: self.cost_usd,
            user_id: self.user_id,
            language: self.language,
            quality_score: INITIAL_QUALITY,
            use_count: 0,
            created_at: now.clone(),
            last_used_at: now,
        }
    }
}

/// User feedback on a served answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Feedback {
    #[strum(to_string = "positive", serialize = "up", serialize = "+")]
    Positive,
    #[strum(to_string = "negative", serialize = "down", serialize = "-")]
    Negative,
}

/// Which entries a cleanup run removes: all three conditions must hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanupPolicy {
    /// Quality strictly below this.
    pub min_quality: f64,
    /// Used at most this many times.
    pub max_uses: u32,
    /// Created more than this many days ago.
    pub min_age_days: u32,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            min_quality: 0.3,
            max_uses: 1,
            min_age_days: 30,
        }
    }
}

/// Current time in the storage timestamp format.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Convert an f32 vector to a little-endian BLOB.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert a little-endian BLOB back to an f32 vector. Trailing bytes are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity `(a·b) / (|a||b|)`.
///
/// Returns 0 when either norm is zero or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn blob_roundtrip_preserves_values() {
        let original = vec![0.1_f32, -0.5, 1.0, f32::MIN_POSITIVE];
        let blob = vec_to_blob(&original);
        assert_eq!(blob.len(), original.len() * 4);
        assert_eq!(blob_to_vec(&blob), original);
    }

    #[test]
    fn zero_vector_similarity_is_zero() {
        let zero = vec![0.0_f32; 4];
        let other = vec![1.0_f32, 2.0, 3.0, 4.0];
        assert_eq!(cosine_similarity(&zero, &other), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = vec![0.3_f32, -1.7, 2.2, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < f32::EPSILON);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_lengths_are_not_compared() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn feedback_parses_aliases() {
        assert_eq!(Feedback::from_str("UP").unwrap(), Feedback::Positive);
        assert_eq!(Feedback::from_str("negative").unwrap(), Feedback::Negative);
        assert_eq!(Feedback::Positive.to_string(), "positive");
    }

    #[test]
    fn new_entry_starts_neutral() {
        let entry = NewCacheEntry {
            question: "q".into(),
            answer: "a".into(),
            category: Category::Simple,
            model: "gpt-4o-mini".into(),
            cost_usd: 0.001,
            user_id: None,
            language: Some("en".into()),
        }
        .into_entry(vec![1.0]);
        assert_eq!(entry.quality_score, INITIAL_QUALITY);
        assert_eq!(entry.use_count, 0);
        assert_eq!(entry.created_at, entry.last_used_at);
    }
}
