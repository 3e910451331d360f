// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frugal - cost-aware request router for AI chat backends.
//!
//! This is the binary entry point: one-shot routing plus the
//! administrative jobs run against the shared database.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use frugal_cache::{CleanupPolicy, Feedback};
use frugal_core::UserTier;
use frugal_knowledge::ExportFormat;
use tracing::error;

use crate::app::App;
use crate::commands::AskArgs;

/// Frugal - cost-aware request router for AI chat backends.
#[derive(Parser, Debug)]
#[command(name = "frugal", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Route a single message and print the answer.
    Ask {
        message: String,
        /// Subscription tier: free, pro or enterprise.
        #[arg(long, default_value = "free")]
        tier: UserTier,
        #[arg(long, default_value = "cli")]
        user_id: String,
        #[arg(long)]
        language: Option<String>,
        /// Force a catalog model instead of automatic selection.
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        system_prompt: Option<String>,
        /// Neither read nor populate the semantic cache.
        #[arg(long)]
        no_cache: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show daily cost, revenue and cache statistics.
    Stats {
        /// Last day of the report (YYYY-MM-DD, UTC). Defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// Number of days to report.
        #[arg(long, default_value_t = 1)]
        days: u32,
        /// Also report lifetime totals for this user.
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Rate a cached answer up or down.
    Feedback {
        entry_id: String,
        /// positive or negative.
        feedback: Feedback,
    },
    /// Recompute quality scores of cached answers.
    Rescore {
        /// Only this entry.
        #[arg(long)]
        entry: Option<String>,
    },
    /// Export high-quality cached answers as fine-tuning JSONL.
    Export {
        /// openai, alpaca or sharegpt.
        #[arg(long, default_value = "openai")]
        format: ExportFormat,
        #[arg(long)]
        min_quality: Option<f64>,
        #[arg(long)]
        min_uses: Option<u32>,
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Report categories with too few or low-quality cached answers.
    Gaps {
        #[arg(long)]
        json: bool,
    },
    /// Delete stale, unused, low-quality cache entries.
    Cleanup {
        #[arg(long)]
        min_quality: Option<f64>,
        #[arg(long)]
        max_uses: Option<u32>,
        #[arg(long)]
        min_age_days: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => frugal_config::load_and_validate_path(path),
        None => frugal_config::load_and_validate(),
    };
    let config = match config {
        Ok(config) => config,
        Err(errors) => {
            frugal_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.general.log_level);
    frugal_agent::register_metrics();

    let Some(command) = cli.command else {
        println!("frugal: use --help for available commands");
        return;
    };

    let app = match App::build(config).await {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to initialize");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let result = match command {
        Commands::Ask {
            message,
            tier,
            user_id,
            language,
            model,
            system_prompt,
            no_cache,
            json,
        } => {
            commands::run_ask(
                &app,
                AskArgs {
                    message,
                    tier,
                    user_id,
                    language,
                    model,
                    system_prompt,
                    no_cache,
                    json,
                },
            )
            .await
        }
        Commands::Stats {
            date,
            days,
            user,
            json,
        } => commands::run_stats(&app, date, days, user, json).await,
        Commands::Feedback { entry_id, feedback } => {
            commands::run_feedback(&app, &entry_id, feedback).await
        }
        Commands::Rescore { entry } => commands::run_rescore(&app, entry.as_deref()).await,
        Commands::Export {
            format,
            min_quality,
            min_uses,
            output,
        } => commands::run_export(&app, format, min_quality, min_uses, output.as_deref()).await,
        Commands::Gaps { json } => commands::run_gaps(&app, json).await,
        Commands::Cleanup {
            min_quality,
            max_uses,
            min_age_days,
        } => {
            let defaults = app.cleanup_policy();
            let policy = CleanupPolicy {
                min_quality: min_quality.unwrap_or(defaults.min_quality),
                max_uses: max_uses.unwrap_or(defaults.max_uses),
                min_age_days: min_age_days.unwrap_or(defaults.min_age_days),
            };
            commands::run_cleanup(&app, policy).await
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("frugal={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
