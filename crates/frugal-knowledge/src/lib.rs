// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge capitalization over the semantic cache store.
//!
//! Administrative jobs that run outside the request path:
//! - rescoring entries from reuse, answer length and source-model tier
//! - exporting high-quality entries as fine-tuning JSONL
//! - per-category gap analysis

pub mod export;
pub mod gaps;
pub mod scoring;

use frugal_cache::CacheStore;

pub use export::{ExportFormat, FineTuningExport};
pub use gaps::{CategoryGap, GapReport};
pub use scoring::{RescoreSummary, length_suitability, tier_score};

/// Tunables for the capitalizer jobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnowledgeSettings {
    /// Use count at which the reuse component saturates at 1.0.
    pub reuse_saturation: u32,
    /// Categories with fewer entries are flagged as gaps.
    pub min_entries_per_category: usize,
    /// Categories averaging below this quality are flagged as gaps.
    pub min_avg_quality: f64,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            reuse_saturation: 20,
            min_entries_per_category: 10,
            min_avg_quality: 0.5,
        }
    }
}

/// Runs rescoring, export and gap analysis against a cache store.
pub struct KnowledgeCapitalizer {
    store: CacheStore,
    settings: KnowledgeSettings,
}

impl KnowledgeCapitalizer {
    pub fn new(store: CacheStore, settings: KnowledgeSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &KnowledgeSettings {
        &self.settings
    }
}
