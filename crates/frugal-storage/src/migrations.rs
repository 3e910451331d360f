// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied on
//! every [`Database::open`](crate::Database::open).

use frugal_core::FrugalError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in `refinery_schema_history`.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), FrugalError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(crate::storage_err)?;
    for migration in report.applied_migrations() {
        tracing::debug!(name = %migration.name(), version = migration.version(), "migration applied");
    }
    Ok(())
}
