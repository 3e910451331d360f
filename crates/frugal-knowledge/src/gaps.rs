// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-category coverage and quality report. Read-only.

use frugal_core::{Category, FrugalError};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::KnowledgeCapitalizer;

/// Coverage of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGap {
    pub category: Category,
    pub entries: usize,
    pub total_uses: u64,
    pub avg_uses: f64,
    pub avg_quality: f64,
    /// Why the category is flagged; empty when healthy.
    pub reasons: Vec<String>,
}

impl CategoryGap {
    pub fn is_gap(&self) -> bool {
        !self.reasons.is_empty()
    }
}

/// Report over every category, in classifier priority order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub categories: Vec<CategoryGap>,
}

impl GapReport {
    pub fn gaps(&self) -> impl Iterator<Item = &CategoryGap> {
        self.categories.iter().filter(|c| c.is_gap())
    }
}

impl KnowledgeCapitalizer {
    /// Summarize reuse and quality per category and flag weak ones.
    pub async fn analyze_gaps(&self) -> Result<GapReport, FrugalError> {
        let entries = self.store.list_all().await?;

        let categories = Category::iter()
            .map(|category| {
                let mine: Vec<_> = entries.iter().filter(|e| e.category == category).collect();
                let count = mine.len();
                let total_uses: u64 = mine.iter().map(|e| u64::from(e.use_count)).sum();
                let quality_sum: f64 = mine.iter().map(|e| e.quality_score).sum();
                let (avg_uses, avg_quality) = if count == 0 {
                    (0.0, 0.0)
                } else {
                    (total_uses as f64 / count as f64, quality_sum / count as f64)
                };

                let mut reasons = Vec::new();
                if count < self.settings.min_entries_per_category {
                    reasons.push(format!(
                        "only {count} entries (want {})",
                        self.settings.min_entries_per_category
                    ));
                }
                if count > 0 && avg_quality < self.settings.min_avg_quality {
                    reasons.push(format!(
                        "average quality {avg_quality:.2} below {:.2}",
                        self.settings.min_avg_quality
                    ));
                }

                CategoryGap {
                    category,
                    entries: count,
                    total_uses,
                    avg_uses,
                    avg_quality,
                    reasons,
                }
            })
            .collect();

        Ok(GapReport { categories })
    }
}
