// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request routing orchestrator for the Frugal core.
//!
//! [`ChatRouter`] is the central coordinator that:
//! - Answers repeated questions from the semantic cache
//! - Classifies new messages and selects the cheapest suitable model
//! - Fails over across providers in a fixed order
//! - Records cost, price and margin for every answer
//! - Stores fresh answers back into the cache

pub mod fallback;
pub mod metrics;
pub mod registry;
pub mod routing;

pub use fallback::{Answered, DEFAULT_FALLBACK_ORDER, FallbackChain};
pub use metrics::register_metrics;
pub use registry::ProviderRegistry;
pub use routing::{ChatRouter, CostInfo, RouteOptions, RouteResponse, RouterSettings, RoutingInfo};
