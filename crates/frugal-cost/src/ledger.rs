// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost ledger persisting every answered request to SQLite.
//!
//! Each request appends one [`CostRecord`] and folds into the
//! [`DailyAggregate`] for its UTC date. The aggregate is maintained with
//! `INSERT .. ON CONFLICT DO UPDATE` increments inside the same transaction
//! as the record insert, so concurrent requests never lose an update.

use std::collections::BTreeMap;

use frugal_core::{FrugalError, TokenUsage};
use frugal_storage::{Database, map_tr_err};
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

use crate::margin::MarginBreakdown;

/// What kind of work a request paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Chat,
    Image,
    Audio,
    Speech,
    Embedding,
}

/// One answered request. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// UUID v4.
    pub id: String,
    pub user_id: String,
    pub request_type: RequestType,
    /// Provider name, or `cache` for cache hits.
    pub provider: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_usd: f64,
    pub price_usd: f64,
    pub margin_usd: f64,
    pub margin_pct: f64,
    pub from_cache: bool,
    pub cache_entry_id: Option<String>,
    /// ISO 8601 timestamp (UTC).
    pub created_at: String,
}

impl CostRecord {
    /// Record for an answer produced by a provider.
    pub fn provider_answer(
        user_id: impl Into<String>,
        request_type: RequestType,
        provider: impl Into<String>,
        model: impl Into<String>,
        usage: &TokenUsage,
        breakdown: MarginBreakdown,
    ) -> Self {
        Self::build(
            user_id.into(),
            request_type,
            provider.into(),
            model.into(),
            usage,
            breakdown,
            None,
        )
    }

    /// Record for an answer served from the semantic cache.
    pub fn cache_hit(
        user_id: impl Into<String>,
        model: impl Into<String>,
        cache_entry_id: impl Into<String>,
        embedding_cost: f64,
    ) -> Self {
        Self::build(
            user_id.into(),
            RequestType::Chat,
            "cache".to_string(),
            model.into(),
            &TokenUsage::default(),
            MarginBreakdown::unbilled(embedding_cost),
            Some(cache_entry_id.into()),
        )
    }

    fn build(
        user_id: String,
        request_type: RequestType,
        provider: String,
        model: String,
        usage: &TokenUsage,
        breakdown: MarginBreakdown,
        cache_entry_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            request_type,
            provider,
            model,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cost_usd: breakdown.cost_usd,
            price_usd: breakdown.price_usd,
            margin_usd: breakdown.margin_usd,
            margin_pct: breakdown.margin_pct,
            from_cache: cache_entry_id.is_some(),
            cache_entry_id,
            created_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        }
    }

    /// UTC calendar date (`YYYY-MM-DD`) the record belongs to.
    pub fn date(&self) -> &str {
        self.created_at.get(..10).unwrap_or(&self.created_at)
    }
}

/// Per-provider share of a day's spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderCost {
    pub requests: u64,
    pub cost_usd: f64,
}

/// Totals for one UTC date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: String,
    pub total_requests: u64,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub total_margin: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_savings: f64,
    pub provider_costs: BTreeMap<String, ProviderCost>,
}

/// Lifetime totals for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserTotal {
    pub requests: u64,
    pub cost_usd: f64,
    pub price_usd: f64,
}

/// Persistent cost ledger backed by SQLite.
#[derive(Clone)]
pub struct CostLedger {
    db: Database,
}

impl CostLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append `record` and fold it into its day's aggregate.
    ///
    /// `cache_savings` is what a cache hit avoided spending; 0 for misses.
    pub async fn track_request(
        &self,
        record: &CostRecord,
        cache_savings: f64,
    ) -> Result<(), FrugalError> {
        let r = record.clone();
        let date = record.date().to_string();
        let (hits, misses) = if r.from_cache { (1, 0) } else { (0, 1) };

        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO cost_records (id, user_id, request_type, provider, model, \
                     input_tokens, output_tokens, cost_usd, price_usd, margin_usd, margin_pct, \
                     from_cache, cache_entry_id, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                    rusqlite::params![
                        r.id,
                        r.user_id,
                        r.request_type.to_string(),
                        r.provider,
                        r.model,
                        r.input_tokens,
                        r.output_tokens,
                        r.cost_usd,
                        r.price_usd,
                        r.margin_usd,
                        r.margin_pct,
                        r.from_cache,
                        r.cache_entry_id,
                        r.created_at,
                    ],
                )?;
                tx.execute(
                    "INSERT INTO daily_aggregates (date, total_requests, total_cost, \
                     total_revenue, total_margin, cache_hits, cache_misses, cache_savings) \
                     VALUES (?1, 1, ?2, ?3, ?4, ?5, ?6, ?7) \
                     ON CONFLICT(date) DO UPDATE SET \
                       total_requests = total_requests + 1, \
                       total_cost = total_cost + excluded.total_cost, \
                       total_revenue = total_revenue + excluded.total_revenue, \
                       total_margin = total_margin + excluded.total_margin, \
                       cache_hits = cache_hits + excluded.cache_hits, \
                       cache_misses = cache_misses + excluded.cache_misses, \
                       cache_savings = cache_savings + excluded.cache_savings",
                    rusqlite::params![
                        date,
                        r.cost_usd,
                        r.price_usd,
                        r.margin_usd,
                        hits,
                        misses,
                        cache_savings,
                    ],
                )?;
                tx.execute(
                    "INSERT INTO daily_provider_costs (date, provider, requests, cost) \
                     VALUES (?1, ?2, 1, ?3) \
                     ON CONFLICT(date, provider) DO UPDATE SET \
                       requests = requests + 1, cost = cost + excluded.cost",
                    rusqlite::params![date, r.provider, r.cost_usd],
                )?;
                tx.commit()
            })
            .await
            .map_err(map_tr_err)?;

        info!(
            user_id = %record.user_id,
            provider = %record.provider,
            model = %record.model,
            from_cache = record.from_cache,
            cost_usd = record.cost_usd,
            price_usd = record.price_usd,
            "cost recorded"
        );
        Ok(())
    }

    /// Aggregate for one date (`YYYY-MM-DD`), if any request landed on it.
    pub async fn daily_aggregate(&self, date: &str) -> Result<Option<DailyAggregate>, FrugalError> {
        let mut found = self.aggregates_between(date, date).await?;
        Ok(found.pop())
    }

    /// Aggregates for every date in `[from, to]`, oldest first.
    pub async fn aggregates_between(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<DailyAggregate>, FrugalError> {
        let from = from.to_string();
        let to = to.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Vec<DailyAggregate>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT date, total_requests, total_cost, total_revenue, total_margin, \
                     cache_hits, cache_misses, cache_savings FROM daily_aggregates \
                     WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC",
                )?;
                let mut days = stmt
                    .query_map(rusqlite::params![from, to], |row| {
                        Ok(DailyAggregate {
                            date: row.get(0)?,
                            total_requests: row.get(1)?,
                            total_cost: row.get(2)?,
                            total_revenue: row.get(3)?,
                            total_margin: row.get(4)?,
                            cache_hits: row.get(5)?,
                            cache_misses: row.get(6)?,
                            cache_savings: row.get(7)?,
                            provider_costs: BTreeMap::new(),
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut stmt = conn.prepare(
                    "SELECT provider, requests, cost FROM daily_provider_costs WHERE date = ?1",
                )?;
                for day in &mut days {
                    let rows = stmt.query_map(rusqlite::params![day.date], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            ProviderCost {
                                requests: row.get(1)?,
                                cost_usd: row.get(2)?,
                            },
                        ))
                    })?;
                    day.provider_costs = rows.collect::<Result<_, _>>()?;
                }
                Ok(days)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Lifetime request count, cost and revenue for `user_id`.
    pub async fn user_total(&self, user_id: &str) -> Result<UserTotal, FrugalError> {
        let user_id = user_id.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<UserTotal, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(cost_usd), 0.0), COALESCE(SUM(price_usd), 0.0) \
                     FROM cost_records WHERE user_id = ?1",
                    rusqlite::params![user_id],
                    |row| {
                        Ok(UserTotal {
                            requests: row.get(0)?,
                            cost_usd: row.get(1)?,
                            price_usd: row.get(2)?,
                        })
                    },
                )
            })
            .await
            .map_err(map_tr_err)
    }

    /// Fetch a single record by ID.
    pub async fn get_record(&self, id: &str) -> Result<Option<CostRecord>, FrugalError> {
        let id = id.to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<Option<CostRecord>, rusqlite::Error> {
                conn.query_row(
                    "SELECT id, user_id, request_type, provider, model, input_tokens, \
                     output_tokens, cost_usd, price_usd, margin_usd, margin_pct, from_cache, \
                     cache_entry_id, created_at FROM cost_records WHERE id = ?1",
                    rusqlite::params![id],
                    |row| {
                        let request_type: String = row.get(2)?;
                        let request_type = request_type.parse().map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                2,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?;
                        Ok(CostRecord {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            request_type,
                            provider: row.get(3)?,
                            model: row.get(4)?,
                            input_tokens: row.get(5)?,
                            output_tokens: row.get(6)?,
                            cost_usd: row.get(7)?,
                            price_usd: row.get(8)?,
                            margin_usd: row.get(9)?,
                            margin_pct: row.get(10)?,
                            from_cache: row.get(11)?,
                            cache_entry_id: row.get(12)?,
                            created_at: row.get(13)?,
                        })
                    },
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Number of records ever written.
    pub async fn record_count(&self) -> Result<u64, FrugalError> {
        self.db
            .connection()
            .call(|conn| -> Result<u64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM cost_records", [], |row| row.get(0))
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::margin::TargetMargin;

    async fn test_ledger() -> CostLedger {
        CostLedger::new(Database::open_in_memory().await.unwrap())
    }

    fn answer(user: &str, provider: &str, cost: f64, created_at: &str) -> CostRecord {
        let mut r = CostRecord::provider_answer(
            user,
            RequestType::Chat,
            provider,
            "gpt-4o-mini",
            &TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            MarginBreakdown::priced(cost, TargetMargin::default()),
        );
        r.created_at = created_at.to_string();
        r
    }

    #[tokio::test]
    async fn track_request_inserts_record_and_aggregate() {
        let ledger = test_ledger().await;
        let record = answer("alice", "openai", 0.007, "2026-03-01T10:00:00.000Z");
        ledger.track_request(&record, 0.0).await.unwrap();

        let stored = ledger.get_record(&record.id).await.unwrap().unwrap();
        assert_eq!(stored, record);

        let day = ledger.daily_aggregate("2026-03-01").await.unwrap().unwrap();
        assert_eq!(day.total_requests, 1);
        assert_eq!(day.cache_misses, 1);
        assert_eq!(day.cache_hits, 0);
        assert!((day.total_cost - 0.007).abs() < 1e-12);
        assert!((day.total_revenue - 0.01).abs() < 1e-12);
        assert_eq!(day.provider_costs["openai"].requests, 1);
    }

    #[tokio::test]
    async fn aggregates_are_additive_and_split_by_provider() {
        let ledger = test_ledger().await;
        let day = "2026-03-02T08:00:00.000Z";
        ledger.track_request(&answer("a", "openai", 0.01, day), 0.0).await.unwrap();
        ledger.track_request(&answer("b", "groq", 0.02, day), 0.0).await.unwrap();
        ledger.track_request(&answer("a", "groq", 0.03, day), 0.0).await.unwrap();

        let mut hit = CostRecord::cache_hit("a", "gpt-4o-mini", "entry-1", 0.00002);
        hit.created_at = day.to_string();
        ledger.track_request(&hit, 0.005).await.unwrap();

        let agg = ledger.daily_aggregate("2026-03-02").await.unwrap().unwrap();
        assert_eq!(agg.total_requests, 4);
        assert_eq!(agg.cache_hits, 1);
        assert_eq!(agg.cache_misses, 3);
        assert!((agg.cache_savings - 0.005).abs() < 1e-12);
        assert!((agg.total_cost - 0.06002).abs() < 1e-12);
        assert_eq!(agg.provider_costs["groq"].requests, 2);
        assert!((agg.provider_costs["groq"].cost_usd - 0.05).abs() < 1e-12);
        assert_eq!(agg.provider_costs["cache"].requests, 1);
    }

    #[tokio::test]
    async fn cache_hit_record_has_zero_revenue() {
        let hit = CostRecord::cache_hit("u", "gpt-4o", "entry-9", 0.00001);
        assert!(hit.from_cache);
        assert_eq!(hit.provider, "cache");
        assert_eq!(hit.price_usd, 0.0);
        assert_eq!(hit.cost_usd, 0.00001);
        assert_eq!(hit.cache_entry_id.as_deref(), Some("entry-9"));
    }

    #[tokio::test]
    async fn concurrent_tracking_loses_no_updates() {
        const N: usize = 50;
        let ledger = Arc::new(test_ledger().await);
        let handles: Vec<_> = (0..N)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    let record = answer(
                        &format!("user-{}", i % 3),
                        "deepseek",
                        0.001,
                        "2026-04-01T12:00:00.000Z",
                    );
                    ledger.track_request(&record, 0.0).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let agg = ledger.daily_aggregate("2026-04-01").await.unwrap().unwrap();
        assert_eq!(agg.total_requests, N as u64);
        assert!((agg.total_cost - 0.001 * N as f64).abs() < 1e-9);
        assert_eq!(ledger.record_count().await.unwrap(), N as u64);
    }

    #[tokio::test]
    async fn range_and_user_queries() {
        let ledger = test_ledger().await;
        for (user, date) in [
            ("alice", "2026-05-01T00:00:00.000Z"),
            ("alice", "2026-05-02T00:00:00.000Z"),
            ("bob", "2026-05-03T00:00:00.000Z"),
            ("alice", "2026-05-09T00:00:00.000Z"),
        ] {
            ledger.track_request(&answer(user, "gemini", 0.007, date), 0.0).await.unwrap();
        }

        let days = ledger.aggregates_between("2026-05-01", "2026-05-03").await.unwrap();
        let dates: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-05-01", "2026-05-02", "2026-05-03"]);
        assert!(ledger.daily_aggregate("2026-05-04").await.unwrap().is_none());

        let alice = ledger.user_total("alice").await.unwrap();
        assert_eq!(alice.requests, 3);
        assert!((alice.cost_usd - 0.021).abs() < 1e-12);
        assert!((alice.price_usd - 0.03).abs() < 1e-9);
        assert_eq!(ledger.user_total("nobody").await.unwrap(), UserTotal::default());
    }

    #[test]
    fn date_is_utc_prefix() {
        let r = answer("u", "groq", 0.0, "2026-06-30T23:59:59.999Z");
        assert_eq!(r.date(), "2026-06-30");
    }
}
