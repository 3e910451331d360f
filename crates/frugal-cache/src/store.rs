// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed durable store for cache entries.

use std::str::FromStr;

use frugal_core::{Category, FrugalError};
use frugal_storage::{Database, map_tr_err};
use rusqlite::OptionalExtension;

use crate::types::{CacheEntry, blob_to_vec, vec_to_blob};

const COLUMNS: &str = "id, question, answer, embedding, category, model, cost_usd, user_id, \
                       language, quality_score, use_count, created_at, last_used_at";

/// Persistent store for cache entries.
#[derive(Clone)]
pub struct CacheStore {
    db: Database,
}

impl CacheStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a new entry.
    pub async fn insert(&self, entry: &CacheEntry) -> Result<(), FrugalError> {
        let e = entry.clone();
        let blob = vec_to_blob(&e.embedding);
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    &format!(
                        "INSERT INTO cache_entries ({COLUMNS}) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                    ),
                    rusqlite::params![
                        e.id,
                        e.question,
                        e.answer,
                        blob,
                        e.category.to_string(),
                        e.model,
                        e.cost_usd,
                        e.user_id,
                        e.language,
                        e.quality_score,
                        e.use_count,
                        e.created_at,
                        e.last_used_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Get an entry by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<CacheEntry>, FrugalError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<CacheEntry>, rusqlite::Error> {
                conn.query_row(
                    &format!("SELECT {COLUMNS} FROM cache_entries WHERE id = ?1"),
                    rusqlite::params![id],
                    row_to_entry,
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    /// The `limit` best entries: most used first, then highest quality.
    pub async fn load_top(&self, limit: usize) -> Result<Vec<CacheEntry>, FrugalError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query(
            format!(
                "SELECT {COLUMNS} FROM cache_entries \
                 ORDER BY use_count DESC, quality_score DESC, created_at ASC LIMIT ?1"
            ),
            vec![rusqlite::types::Value::Integer(limit)],
        )
        .await
    }

    /// Every entry, oldest first.
    pub async fn list_all(&self) -> Result<Vec<CacheEntry>, FrugalError> {
        self.query(
            format!("SELECT {COLUMNS} FROM cache_entries ORDER BY created_at ASC"),
            Vec::new(),
        )
        .await
    }

    /// Entries with at least `min_quality` and `min_use_count` uses, best first.
    pub async fn list_qualifying(
        &self,
        min_quality: f64,
        min_use_count: u32,
    ) -> Result<Vec<CacheEntry>, FrugalError> {
        self.query(
            format!(
                "SELECT {COLUMNS} FROM cache_entries \
                 WHERE quality_score >= ?1 AND use_count >= ?2 \
                 ORDER BY quality_score DESC, use_count DESC"
            ),
            vec![
                rusqlite::types::Value::Real(min_quality),
                rusqlite::types::Value::Integer(i64::from(min_use_count)),
            ],
        )
        .await
    }

    async fn query(
        &self,
        sql: String,
        params: Vec<rusqlite::types::Value>,
    ) -> Result<Vec<CacheEntry>, FrugalError> {
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<CacheEntry>, rusqlite::Error> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(rusqlite::params_from_iter(params), row_to_entry)?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Increment the use count and refresh `last_used_at`. False if no such entry.
    pub async fn record_hit(&self, id: &str, used_at: &str) -> Result<bool, FrugalError> {
        let id = id.to_string();
        let used_at = used_at.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let changed = conn.execute(
                    "UPDATE cache_entries SET use_count = use_count + 1, last_used_at = ?2 \
                     WHERE id = ?1",
                    rusqlite::params![id, used_at],
                )?;
                Ok(changed > 0)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Add `delta` to the quality score, clamped to [0, 1]. Returns the new score.
    pub async fn adjust_quality(&self, id: &str, delta: f64) -> Result<Option<f64>, FrugalError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<f64>, rusqlite::Error> {
                conn.query_row(
                    "UPDATE cache_entries \
                     SET quality_score = MIN(1.0, MAX(0.0, quality_score + ?2)) \
                     WHERE id = ?1 RETURNING quality_score",
                    rusqlite::params![id, delta],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Overwrite the quality score, clamped to [0, 1]. False if no such entry.
    pub async fn set_quality(&self, id: &str, score: f64) -> Result<bool, FrugalError> {
        let id = id.to_string();
        let score = score.clamp(0.0, 1.0);
        self.db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let changed = conn.execute(
                    "UPDATE cache_entries SET quality_score = ?2 WHERE id = ?1",
                    rusqlite::params![id, score],
                )?;
                Ok(changed > 0)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Delete entries below `min_quality`, used at most `max_uses` times and
    /// created before `created_before`. Returns how many were removed.
    pub async fn delete_stale(
        &self,
        min_quality: f64,
        max_uses: u32,
        created_before: &str,
    ) -> Result<usize, FrugalError> {
        let created_before = created_before.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "DELETE FROM cache_entries \
                     WHERE quality_score < ?1 AND use_count <= ?2 AND created_at < ?3",
                    rusqlite::params![min_quality, max_uses, created_before],
                )
            })
            .await
            .map_err(map_tr_err)
    }

    /// Total number of persisted entries.
    pub async fn count(&self) -> Result<usize, FrugalError> {
        self.db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                let n: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
                Ok(usize::try_from(n).unwrap_or(0))
            })
            .await
            .map_err(map_tr_err)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<CacheEntry, rusqlite::Error> {
    let blob: Vec<u8> = row.get(3)?;
    let category: String = row.get(4)?;
    let category = Category::from_str(&category).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(CacheEntry {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        embedding: blob_to_vec(&blob),
        category,
        model: row.get(5)?,
        cost_usd: row.get(6)?,
        user_id: row.get(7)?,
        language: row.get(8)?,
        quality_score: row.get(9)?,
        use_count: row.get(10)?,
        created_at: row.get(11)?,
        last_used_at: row.get(12)?,
    })
}
