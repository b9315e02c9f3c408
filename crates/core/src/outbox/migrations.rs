//! Outbox database schema migrations.

use crate::{Error, store};
use tokio_rusqlite::Connection;

/// Migration list: (version, SQL). Same scheme as the cache database.
const MIGRATIONS: &[(&str, &str)] = &[("1", include_str!("../../migrations/outbox/001_records.sql"))];

/// Run any pending outbox-database migrations.
///
/// # Errors
///
/// Returns an error if a migration SQL fails to execute.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    store::run_migrations(conn, MIGRATIONS).await
}
