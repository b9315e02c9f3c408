//! Outbox database connection management.
//!
//! Same conventions as the cache database: pragma block on open, schema
//! created lazily by migrations, so the very first offline action finds a
//! working store.

use super::migrations;
use crate::{Error, store};
use std::path::Path;
use tokio_rusqlite::Connection;

/// Outbox database handle.
#[derive(Clone, Debug)]
pub struct OutboxDb {
    pub(crate) conn: Connection,
}

impl OutboxDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;

        store::configure(&conn).await?;
        migrations::run(&conn).await?;

        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;

        store::configure(&conn).await?;
        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}
