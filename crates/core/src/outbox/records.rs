//! Outbox record operations.
//!
//! Records carry an opaque JSON payload; this layer does not interpret what
//! a bookmark or a search-history entry means.

use super::connection::OutboxDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// The outbox categories, each mapping 1:1 to a sync trigger tag and an
/// origin-server endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Bookmarks,
    SearchHistory,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Bookmarks, Category::SearchHistory];

    /// Stable identifier used as the storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bookmarks => "bookmarks",
            Category::SearchHistory => "search-history",
        }
    }

    /// Sync trigger tag raised when connectivity returns.
    pub fn sync_tag(&self) -> &'static str {
        match self {
            Category::Bookmarks => "sync-bookmarks",
            Category::SearchHistory => "sync-search-history",
        }
    }

    /// Origin-server endpoint the category replays against.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Bookmarks => "/api/bookmarks",
            Category::SearchHistory => "/api/search-history",
        }
    }

    /// Resolve a sync trigger tag back to its category.
    pub fn from_sync_tag(tag: &str) -> Result<Self, Error> {
        match tag {
            "sync-bookmarks" => Ok(Category::Bookmarks),
            "sync-search-history" => Ok(Category::SearchHistory),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending mutation recorded while offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub id: i64,
    pub category: Category,
    pub payload: serde_json::Value,
    pub created_at: String,
}

impl OutboxDb {
    /// Append a record for a category.
    ///
    /// Returns the assigned record id. The record is durable once this
    /// returns; it stays in the store until a fully successful replay batch
    /// clears the category.
    pub async fn enqueue(&self, category: Category, payload: &serde_json::Value) -> Result<i64, Error> {
        let category = category.as_str();
        let payload = serde_json::to_string(payload)?;
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO outbox (category, payload, created_at) VALUES (?1, ?2, ?3)",
                    params![category, payload, created_at],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Error::from)
    }

    /// Every pending record for a category.
    ///
    /// Rows come back in insertion order, but callers must not rely on
    /// ordering beyond "all pending records are returned".
    pub async fn drain_all(&self, category: Category) -> Result<Vec<OutboxRecord>, Error> {
        let name = category.as_str();
        self.conn
            .call(move |conn| -> Result<Vec<OutboxRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, payload, created_at FROM outbox WHERE category = ?1 ORDER BY id",
                )?;

                let rows = stmt
                    .query_map(params![name], |row| {
                        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
                    })?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;

                let mut records = Vec::with_capacity(rows.len());
                for (id, payload, created_at) in rows {
                    records.push(OutboxRecord {
                        id,
                        category,
                        payload: serde_json::from_str(&payload).map_err(Error::Serialization)?,
                        created_at,
                    });
                }
                Ok(records)
            })
            .await
            .map_err(Error::from)
    }

    /// Remove every record for a category.
    ///
    /// Only called after every record in a drained batch has been
    /// acknowledged by the origin server. Returns the number of deleted
    /// records.
    pub async fn clear_all(&self, category: Category) -> Result<u64, Error> {
        let name = category.as_str();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let deleted = conn.execute("DELETE FROM outbox WHERE category = ?1", params![name])?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of pending records for a category.
    pub async fn count(&self, category: Category) -> Result<u64, Error> {
        let name = category.as_str();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM outbox WHERE category = ?1",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
