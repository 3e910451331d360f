// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; nothing is collected until the embedding
//! application installs a recorder.

use metrics::{describe_counter, describe_histogram};

/// Register all routing metric descriptions.
pub fn register_metrics() {
    describe_counter!("frugal_requests_total", "Routed requests by category and source");
    describe_counter!("frugal_cache_hits_total", "Semantic cache hits");
    describe_counter!("frugal_cache_misses_total", "Semantic cache misses");
    describe_counter!(
        "frugal_provider_failures_total",
        "Provider attempts that failed or timed out"
    );
    describe_counter!(
        "frugal_cost_usd_micros_total",
        "Provider and embedding spend in micro-dollars"
    );
    describe_histogram!(
        "frugal_route_latency_seconds",
        "End-to-end routing latency in seconds"
    );
}

/// Record a routed request.
pub fn record_request(category: &str, source: &'static str) {
    metrics::counter!("frugal_requests_total", "category" => category.to_string(), "source" => source)
        .increment(1);
}

pub fn record_cache_hit() {
    metrics::counter!("frugal_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    metrics::counter!("frugal_cache_misses_total").increment(1);
}

/// Record a failed or timed-out provider attempt.
pub fn record_provider_failure(provider: &str) {
    metrics::counter!("frugal_provider_failures_total", "provider" => provider.to_string())
        .increment(1);
}

/// Record spend. Counters are integral, so cost is stored in micro-dollars.
pub fn record_cost(provider: &str, cost_usd: f64) {
    let micros = (cost_usd.max(0.0) * 1_000_000.0).round() as u64;
    metrics::counter!("frugal_cost_usd_micros_total", "provider" => provider.to_string())
        .increment(micros);
}

pub fn record_latency(seconds: f64) {
    metrics::histogram!("frugal_route_latency_seconds").record(seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_a_noop() {
        register_metrics();
        record_request("simple", "provider");
        record_cache_hit();
        record_cache_miss();
        record_provider_failure("groq");
        record_cost("groq", 0.0012);
        record_cost("cache", -1.0);
        record_latency(0.25);
    }
}
