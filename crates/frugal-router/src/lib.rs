// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message classification and model selection for the Frugal routing core.
//!
//! This crate provides:
//! - the static provider [`catalog`] of models, cost tiers and capabilities
//! - [`ComplexityClassifier`]: regex signatures plus word-count breakpoints
//! - [`ModelSelector`]: cheapest capable model a user tier may reach
//!
//! Everything here is pure and synchronous. No network, no storage.

pub mod catalog;
pub mod classifier;
pub mod selector;

pub use catalog::{ModelDescriptor, catalog, find_model, models_for, safe_default};
pub use classifier::{Classification, ComplexityClassifier};
pub use selector::ModelSelector;
