//! Cache database schema migrations.

use crate::{Error, store};
use tokio_rusqlite::Connection;

/// Migration list: (version, SQL).
///
/// Migrations must be applied in order. The version number is an
/// incrementing integer used to track which migrations have been applied.
/// All migrations are idempotent using CREATE IF NOT EXISTS.
const MIGRATIONS: &[(&str, &str)] = &[("1", include_str!("../../migrations/cache/001_partitions.sql"))];

/// Run any pending cache-database migrations.
///
/// # Errors
///
/// Returns an error if a migration SQL fails to execute.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    store::run_migrations(conn, MIGRATIONS).await
}
