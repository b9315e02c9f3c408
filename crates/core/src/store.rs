//! Shared SQLite plumbing for the cache and outbox databases.
//!
//! Both stores use the same pragma configuration and the same version-table
//! migration scheme; each passes its own migration list.

use std::num::ParseIntError;

use crate::Error;
use tokio_rusqlite::{Connection, params};

/// Apply the standard pragma block to a freshly opened connection.
pub(crate) async fn configure(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;
             PRAGMA foreign_keys=ON;",
        )?;
        Ok(())
    })
    .await
    .map_err(Error::Database)
}

/// Run any pending migrations from the given list.
///
/// Creates the _migrations table if it doesn't exist, checks the current
/// version, and applies any migrations that haven't been run yet. Migration
/// SQL is idempotent (CREATE IF NOT EXISTS), so replays are harmless.
///
/// # Errors
///
/// Returns an error if a migration SQL fails to execute.
pub(crate) async fn run_migrations(conn: &Connection, migrations: &'static [(&str, &str)]) -> Result<(), Error> {
    conn.call(move |conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(Error::from)?;

        let current: i64 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| {
                row.get(0)
            })
            .map_err(Error::from)?;

        for (version, sql) in migrations {
            let version_num: i64 = version
                .parse()
                .map_err(|e: ParseIntError| Error::MigrationFailed(e.to_string()))?;
            if version_num > current {
                conn.execute_batch(sql)?;
                conn.execute(
                    "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                    params![version_num, chrono::Utc::now().to_rfc3339()],
                )
                .map_err(Error::from)?;
                tracing::debug!(version = version_num, "applied migration");
            }
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[(&str, &str)] = &[("1", "CREATE TABLE IF NOT EXISTS sample (id INTEGER PRIMARY KEY)")];

    #[tokio::test]
    async fn test_run_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run_migrations(&conn, SAMPLE).await.unwrap();
        run_migrations(&conn, SAMPLE).await.unwrap();

        let has_sample: bool = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='sample')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert!(has_sample);
    }

    #[tokio::test]
    async fn test_run_migrations_version_tracking() {
        let conn = Connection::open_in_memory().await.unwrap();
        run_migrations(&conn, SAMPLE).await.unwrap();

        let count: i64 = conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0)))
            .await
            .unwrap();

        assert_eq!(count, SAMPLE.len() as i64);
    }
}
