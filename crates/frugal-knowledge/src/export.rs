// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fine-tuning export of high-quality cache entries as JSONL.

use frugal_core::FrugalError;
use serde::Serialize;
use serde_json::json;
use strum::{Display, EnumString};
use tracing::info;

use crate::KnowledgeCapitalizer;

/// Output dialect for fine-tuning files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    /// `{"messages": [{role, content}, ...]}` per line.
    #[default]
    OpenAi,
    /// `{"instruction", "input", "output"}` per line.
    Alpaca,
    /// `{"conversations": [{from, value}, ...]}` per line.
    ShareGpt,
}

/// Qualifying entries rendered as one JSON object each.
#[derive(Debug, Clone, PartialEq)]
pub struct FineTuningExport {
    pub format: ExportFormat,
    pub records: Vec<serde_json::Value>,
}

impl FineTuningExport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One JSON object per line, newline-terminated.
    pub fn to_jsonl(&self) -> Result<String, FrugalError> {
        let mut out = String::new();
        for record in &self.records {
            let line = serde_json::to_string(record)
                .map_err(|e| FrugalError::Internal(format!("export serialization failed: {e}")))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}

fn render(format: ExportFormat, question: &str, answer: &str) -> serde_json::Value {
    match format {
        ExportFormat::OpenAi => json!({
            "messages": [
                {"role": "user", "content": question},
                {"role": "assistant", "content": answer},
            ]
        }),
        ExportFormat::Alpaca => json!({
            "instruction": question,
            "input": "",
            "output": answer,
        }),
        ExportFormat::ShareGpt => json!({
            "conversations": [
                {"from": "human", "value": question},
                {"from": "gpt", "value": answer},
            ]
        }),
    }
}

impl KnowledgeCapitalizer {
    /// Entries with quality ≥ `min_quality` and at least `min_use_count`
    /// uses, best first, rendered in `format`.
    pub async fn export_for_fine_tuning(
        &self,
        min_quality: f64,
        min_use_count: u32,
        format: ExportFormat,
    ) -> Result<FineTuningExport, FrugalError> {
        let entries = self.store.list_qualifying(min_quality, min_use_count).await?;
        let records: Vec<_> = entries
            .iter()
            .map(|e| render(format, &e.question, &e.answer))
            .collect();
        info!(%format, exported = records.len(), min_quality, min_use_count, "fine-tuning export built");
        Ok(FineTuningExport { format, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use crate::KnowledgeSettings;
    use frugal_cache::{CacheEntry, CacheStore};
    use frugal_core::Category;
    use frugal_storage::Database;

    fn entry(id: &str, quality: f64, uses: u32) -> CacheEntry {
        CacheEntry {
            id: id.into(),
            question: format!("question {id}"),
            answer: format!("answer {id}"),
            embedding: vec![0.5, 0.5],
            category: Category::Analysis,
            model: "gpt-4o".into(),
            cost_usd: 0.01,
            user_id: None,
            language: None,
            quality_score: quality,
            use_count: uses,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            last_used_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    async fn seeded() -> KnowledgeCapitalizer {
        let store = CacheStore::new(Database::open_in_memory().await.unwrap());
        for e in [entry("a", 0.9, 5), entry("b", 0.95, 1), entry("c", 0.4, 10), entry("d", 0.8, 3)] {
            store.insert(&e).await.unwrap();
        }
        KnowledgeCapitalizer::new(store, KnowledgeSettings::default())
    }

    #[test]
    fn format_parses() {
        assert_eq!(ExportFormat::from_str("openai").unwrap(), ExportFormat::OpenAi);
        assert_eq!(ExportFormat::from_str("ShareGPT").unwrap(), ExportFormat::ShareGpt);
        assert_eq!(ExportFormat::Alpaca.to_string(), "alpaca");
    }

    #[tokio::test]
    async fn exports_only_qualifying_entries_best_first() {
        let k = seeded().await;
        let export = k.export_for_fine_tuning(0.7, 3, ExportFormat::Alpaca).await.unwrap();
        assert_eq!(export.len(), 2);
        assert_eq!(export.records[0]["instruction"], "question a");
        assert_eq!(export.records[1]["output"], "answer d");
    }

    #[tokio::test]
    async fn openai_jsonl_has_one_line_per_entry() {
        let k = seeded().await;
        let export = k.export_for_fine_tuning(0.7, 3, ExportFormat::OpenAi).await.unwrap();
        let jsonl = export.to_jsonl().unwrap();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["messages"][0]["role"], "user");
        assert_eq!(first["messages"][1]["content"], "answer a");
    }

    #[tokio::test]
    async fn sharegpt_uses_human_and_gpt() {
        let k = seeded().await;
        let export = k.export_for_fine_tuning(0.0, 0, ExportFormat::ShareGpt).await.unwrap();
        assert_eq!(export.len(), 4);
        assert_eq!(export.records[0]["conversations"][1]["from"], "gpt");
    }

    #[tokio::test]
    async fn nothing_qualifies() {
        let k = seeded().await;
        let export = k.export_for_fine_tuning(0.99, 100, ExportFormat::OpenAi).await.unwrap();
        assert!(export.is_empty());
        assert_eq!(export.to_jsonl().unwrap(), "");
    }
}
