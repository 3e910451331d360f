// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost accounting for the Frugal routing core.
//!
//! This crate provides:
//! - **Pricing**: per-model token prices (from the provider catalog) and
//!   per-item prices for image, audio and speech models
//! - **Margin**: the price charged for a cost at a target margin
//! - **Ledger**: append-only cost records plus additive daily aggregates

pub mod ledger;
pub mod margin;
pub mod pricing;

pub use ledger::{CostLedger, CostRecord, DailyAggregate, ProviderCost, RequestType, UserTotal};
pub use margin::{MarginBreakdown, TargetMargin, calculate_price};
pub use pricing::{ModelPricing, UsageExtras, calculate_cost, get_pricing};
