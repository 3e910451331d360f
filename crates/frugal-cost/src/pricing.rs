// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing and cost calculation.
//!
//! Token models take their prices from the provider catalog. Image, audio
//! transcription and speech models are billed per item:
//!
//! dall-e-3:  $0.04 per image
//! whisper-1: $0.006 per minute of audio
//! tts-1:     $15.00 per 1M characters

use frugal_core::TokenUsage;
use tracing::warn;

/// How a model is billed, in USD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelPricing {
    /// Per million input and output tokens.
    Tokens {
        input_per_mtok: f64,
        output_per_mtok: f64,
    },
    PerImage(f64),
    PerMinute(f64),
    PerMillionChars(f64),
}

/// Usage that is not measured in tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageExtras {
    pub images: u32,
    pub duration_secs: f64,
    pub characters: u64,
}

const PER_ITEM: &[(&str, ModelPricing)] = &[
    ("dall-e-3", ModelPricing::PerImage(0.04)),
    ("whisper-1", ModelPricing::PerMinute(0.006)),
    ("tts-1", ModelPricing::PerMillionChars(15.0)),
];

/// Look up pricing for a model identifier (case-insensitive).
pub fn get_pricing(model: &str) -> Option<ModelPricing> {
    if let Some(descriptor) = frugal_router::find_model(model) {
        return Some(ModelPricing::Tokens {
            input_per_mtok: descriptor.input_price,
            output_per_mtok: descriptor.output_price,
        });
    }
    PER_ITEM
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(model))
        .map(|(_, pricing)| *pricing)
}

/// Actual cost in USD of one call to `model`.
///
/// Unknown models cost 0 and log a warning so accounting never blocks an answer.
pub fn calculate_cost(model: &str, usage: &TokenUsage, extras: &UsageExtras) -> f64 {
    let Some(pricing) = get_pricing(model) else {
        warn!(model, "no pricing for model, recording zero cost");
        return 0.0;
    };

    match pricing {
        ModelPricing::Tokens {
            input_per_mtok,
            output_per_mtok,
        } => {
            (f64::from(usage.input_tokens) / 1_000_000.0) * input_per_mtok
                + (f64::from(usage.output_tokens) / 1_000_000.0) * output_per_mtok
        }
        ModelPricing::PerImage(price) => f64::from(extras.images) * price,
        ModelPricing::PerMinute(price) => (extras.duration_secs / 60.0) * price,
        ModelPricing::PerMillionChars(price) => (extras.characters as f64 / 1_000_000.0) * price,
    }
}
