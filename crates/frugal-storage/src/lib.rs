// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Frugal routing core.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. The cache, the cost
//! ledger and the knowledge jobs all share one [`Database`] handle.

pub mod database;
pub mod migrations;

pub use database::{Database, map_tr_err, storage_err};
