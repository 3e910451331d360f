// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI command implementations.

use std::path::Path;

use frugal_agent::RouteOptions;
use frugal_cache::{CleanupPolicy, Feedback};
use frugal_core::{FrugalError, UserTier};
use frugal_cost::DailyAggregate;
use frugal_knowledge::ExportFormat;

use crate::app::App;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, FrugalError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| FrugalError::Internal(format!("failed to serialize output: {e}")))
}

/// Arguments of `frugal ask`.
pub struct AskArgs {
    pub message: String,
    pub tier: UserTier,
    pub user_id: String,
    pub language: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub no_cache: bool,
    pub json: bool,
}

/// Route one message and print the answer.
pub async fn run_ask(app: &App, args: AskArgs) -> Result<(), FrugalError> {
    let options = RouteOptions {
        user_tier: args.tier,
        user_id: args.user_id,
        system_prompt: args.system_prompt,
        language: args.language,
        force_model: args.model,
        skip_cache: args.no_cache,
    };
    let response = app.router.route(&args.message, &[], options).await?;

    if args.json {
        println!("{}", to_json(&response)?);
        return Ok(());
    }

    println!("{}", response.content);
    eprintln!();
    eprintln!(
        "  {} via {} | {} / {} tier | {} ms",
        response.model,
        response.provider,
        response.routing.category,
        response.routing.tier,
        response.routing.latency_ms
    );
    eprintln!(
        "  cost ${:.6}  price ${:.6}  margin ${:.6}",
        response.cost.cost_usd, response.cost.price_usd, response.cost.margin_usd
    );
    if let Some(id) = &response.cache_entry_id {
        let label = if response.from_cache { "served from cache" } else { "cached as" };
        eprintln!("  {label} {id}");
    }
    Ok(())
}

/// Print daily aggregates for `days` days ending at `date` (default today, UTC).
pub async fn run_stats(
    app: &App,
    date: Option<String>,
    days: u32,
    user: Option<String>,
    json: bool,
) -> Result<(), FrugalError> {
    let to = match date {
        Some(date) => chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| FrugalError::Config(format!("invalid date `{date}`: {e}")))?,
        None => chrono::Utc::now().date_naive(),
    };
    let from = to - chrono::Days::new(u64::from(days.saturating_sub(1)));
    let ledger = app.router.ledger();
    let aggregates = ledger
        .aggregates_between(&from.to_string(), &to.to_string())
        .await?;
    let cache = app.router.cache().stats().await;
    let user_total = match &user {
        Some(id) => Some(ledger.user_total(id).await?),
        None => None,
    };

    if json {
        let out = serde_json::json!({
            "from": from.to_string(),
            "to": to.to_string(),
            "days": aggregates,
            "user": user_total,
            "cache": {
                "indexed": cache.indexed,
                "capacity": cache.capacity,
                "dimensions": cache.dimensions,
                "similarity_threshold": cache.similarity_threshold,
            },
        });
        println!("{}", to_json(&out)?);
        return Ok(());
    }

    println!("frugal stats {from} .. {to}");
    if aggregates.is_empty() {
        println!("  no requests recorded");
    }
    for day in &aggregates {
        print_day(day);
    }
    if let (Some(id), Some(total)) = (user, user_total) {
        println!(
            "  user {id}: {} requests, cost ${:.6}, billed ${:.6}",
            total.requests, total.cost_usd, total.price_usd
        );
    }
    println!(
        "  cache: {}/{} entries indexed, {} dims, threshold {:.2}",
        cache.indexed, cache.capacity, cache.dimensions, cache.similarity_threshold
    );
    Ok(())
}

fn print_day(day: &DailyAggregate) {
    let lookups = day.cache_hits + day.cache_misses;
    let hit_rate = if lookups > 0 {
        day.cache_hits as f64 / lookups as f64 * 100.0
    } else {
        0.0
    };
    println!(
        "  {}: {} requests, cost ${:.6}, revenue ${:.6}, margin ${:.6}, cache {:.1}% hit (saved ${:.6})",
        day.date,
        day.total_requests,
        day.total_cost,
        day.total_revenue,
        day.total_margin,
        hit_rate,
        day.cache_savings
    );
    for (provider, cost) in &day.provider_costs {
        println!(
            "    {provider}: {} requests, ${:.6}",
            cost.requests, cost.cost_usd
        );
    }
}

pub async fn run_feedback(app: &App, entry_id: &str, feedback: Feedback) -> Result<(), FrugalError> {
    match app.router.feedback(entry_id, feedback).await? {
        Some(score) => println!("{entry_id}: quality now {score:.2}"),
        None => {
            return Err(FrugalError::Internal(format!("no cache entry `{entry_id}`")));
        }
    }
    Ok(())
}

/// Rescore one entry, or every entry when `entry_id` is `None`.
pub async fn run_rescore(app: &App, entry_id: Option<&str>) -> Result<(), FrugalError> {
    match entry_id {
        Some(id) => match app.knowledge.update_quality_score(id).await? {
            Some(score) => println!("{id}: quality now {score:.3}"),
            None => return Err(FrugalError::Internal(format!("no cache entry `{id}`"))),
        },
        None => {
            let summary = app.knowledge.rescore_all().await?;
            println!(
                "rescored {} entries, average quality {:.3} -> {:.3}",
                summary.rescored, summary.average_before, summary.average_after
            );
        }
    }
    Ok(())
}

/// Write qualifying entries as JSONL to `output`, or stdout.
pub async fn run_export(
    app: &App,
    format: ExportFormat,
    min_quality: Option<f64>,
    min_uses: Option<u32>,
    output: Option<&Path>,
) -> Result<(), FrugalError> {
    let min_quality = min_quality.unwrap_or(app.config.knowledge.export_min_quality);
    let min_uses = min_uses.unwrap_or(app.config.knowledge.export_min_use_count);
    let export = app
        .knowledge
        .export_for_fine_tuning(min_quality, min_uses, format)
        .await?;
    let jsonl = export.to_jsonl()?;

    match output {
        Some(path) => {
            std::fs::write(path, jsonl).map_err(|e| FrugalError::Storage { source: e.into() })?;
            eprintln!("wrote {} {format} records to {}", export.len(), path.display());
        }
        None => print!("{jsonl}"),
    }
    Ok(())
}

pub async fn run_gaps(app: &App, json: bool) -> Result<(), FrugalError> {
    let report = app.knowledge.analyze_gaps().await?;
    if json {
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    for category in &report.categories {
        let flag = if category.is_gap() { "GAP" } else { "ok " };
        println!(
            "  [{flag}] {:<10} {:>5} entries  {:>7.2} avg uses  {:.2} avg quality",
            category.category.to_string(),
            category.entries,
            category.avg_uses,
            category.avg_quality
        );
        for reason in &category.reasons {
            println!("          - {reason}");
        }
    }
    Ok(())
}

pub async fn run_cleanup(app: &App, policy: CleanupPolicy) -> Result<(), FrugalError> {
    let removed = app.router.cache().cleanup(policy).await?;
    let stats = app.router.cache().stats().await;
    println!(
        "removed {removed} stale entries (quality < {:.2}, uses <= {}, older than {} days); {} indexed",
        policy.min_quality, policy.max_uses, policy.min_age_days, stats.indexed
    );
    Ok(())
}
