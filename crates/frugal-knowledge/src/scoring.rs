// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quality rescoring.
//!
//! `new = 0.4 * reuse + 0.3 * length + 0.3 * tier`, then blended with the
//! current score as `0.7 * old + 0.3 * new`.

use frugal_cache::CacheEntry;
use frugal_core::{CostTier, FrugalError};
use tracing::{debug, info};

use crate::KnowledgeCapitalizer;

const REUSE_WEIGHT: f64 = 0.4;
const LENGTH_WEIGHT: f64 = 0.3;
const TIER_WEIGHT: f64 = 0.3;
const KEEP_OLD: f64 = 0.7;

/// How well an answer's length suits reuse, in [0, 1].
pub fn length_suitability(answer: &str) -> f64 {
    match answer.chars().count() {
        0..50 => 0.3,
        50..=2000 => 1.0,
        2001..=5000 => 0.7,
        _ => 0.4,
    }
}

/// Trust in the source model's tier. Unknown models score as neutral.
pub fn tier_score(model: &str) -> f64 {
    match frugal_router::find_model(model).map(|m| m.tier) {
        Some(CostTier::Premium) => 1.0,
        Some(CostTier::Mid) => 0.8,
        Some(CostTier::Cheap) => 0.6,
        Some(CostTier::Free) | None => 0.5,
    }
}

/// Outcome of a batch rescore.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RescoreSummary {
    pub rescored: usize,
    pub average_before: f64,
    pub average_after: f64,
}

impl KnowledgeCapitalizer {
    /// Blended score for `entry` without persisting it.
    pub fn score(&self, entry: &CacheEntry) -> f64 {
        let saturation = f64::from(self.settings.reuse_saturation.max(1));
        let reuse = (f64::from(entry.use_count) / saturation).min(1.0);
        let fresh = REUSE_WEIGHT * reuse
            + LENGTH_WEIGHT * length_suitability(&entry.answer)
            + TIER_WEIGHT * tier_score(&entry.model);
        (KEEP_OLD * entry.quality_score + (1.0 - KEEP_OLD) * fresh).clamp(0.0, 1.0)
    }

    /// Recompute and persist the quality of one entry. `None` if it does not exist.
    pub async fn update_quality_score(&self, entry_id: &str) -> Result<Option<f64>, FrugalError> {
        let Some(entry) = self.store.get_by_id(entry_id).await? else {
            return Ok(None);
        };
        let score = self.score(&entry);
        self.store.set_quality(entry_id, score).await?;
        debug!(entry_id, old = entry.quality_score, new = score, "quality rescored");
        Ok(Some(score))
    }

    /// Rescore every stored entry.
    pub async fn rescore_all(&self) -> Result<RescoreSummary, FrugalError> {
        let entries = self.store.list_all().await?;
        if entries.is_empty() {
            return Ok(RescoreSummary::default());
        }

        let mut before = 0.0;
        let mut after = 0.0;
        for entry in &entries {
            let score = self.score(entry);
            self.store.set_quality(&entry.id, score).await?;
            before += entry.quality_score;
            after += score;
        }

        let n = entries.len() as f64;
        let summary = RescoreSummary {
            rescored: entries.len(),
            average_before: before / n,
            average_after: after / n,
        };
        info!(
            rescored = summary.rescored,
            average_before = summary.average_before,
            average_after = summary.average_after,
            "cache rescored"
        );
        Ok(summary)
    }
}
