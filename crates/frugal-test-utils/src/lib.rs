// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Frugal integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider with scripted replies and failures
//! - [`MockEmbedder`] - Deterministic bag-of-words embedding adapter
//! - [`TestHarness`] - Full routing stack over a temp SQLite database

pub mod harness;
pub mod mock_embedder;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_embedder::MockEmbedder;
pub use mock_provider::MockProvider;
