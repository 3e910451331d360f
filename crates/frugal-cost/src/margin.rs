// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Target-margin pricing.

use frugal_core::FrugalError;
use serde::Serialize;

/// A margin fraction in `[0, 1)`. Construction rejects anything else, so
/// [`calculate_price`] never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct TargetMargin(f64);

impl TargetMargin {
    pub fn new(margin: f64) -> Result<Self, FrugalError> {
        if (0.0..1.0).contains(&margin) {
            Ok(Self(margin))
        } else {
            Err(FrugalError::Config(format!(
                "target margin must be in [0, 1), got {margin}"
            )))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for TargetMargin {
    fn default() -> Self {
        Self(0.30)
    }
}

/// Price that yields `margin` on `cost`: `cost / (1 - margin)`.
pub fn calculate_price(cost: f64, margin: TargetMargin) -> f64 {
    cost / (1.0 - margin.0)
}

/// Cost, price and the margin between them for one answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MarginBreakdown {
    pub cost_usd: f64,
    pub price_usd: f64,
    pub margin_usd: f64,
    /// Margin as a percentage of price; 0 when nothing was charged.
    pub margin_pct: f64,
}

impl MarginBreakdown {
    /// Breakdown for a provider answer charged at `margin`.
    pub fn priced(cost_usd: f64, margin: TargetMargin) -> Self {
        let price_usd = calculate_price(cost_usd, margin);
        Self::new(cost_usd, price_usd)
    }

    /// Breakdown for an answer that is not charged (cache hits).
    pub fn unbilled(cost_usd: f64) -> Self {
        Self::new(cost_usd, 0.0)
    }

    fn new(cost_usd: f64, price_usd: f64) -> Self {
        let margin_usd = price_usd - cost_usd;
        let margin_pct = if price_usd > 0.0 {
            margin_usd / price_usd * 100.0
        } else {
            0.0
        };
        Self {
            cost_usd,
            price_usd,
            margin_usd,
            margin_pct,
        }
    }
}
