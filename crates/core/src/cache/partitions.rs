//! Partition and snapshot CRUD operations.
//!
//! Partitions are named, versioned containers; snapshots are immutable
//! copies of successful responses keyed by request identity. Deleting a
//! partition cascades to its entries.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// The two partition generations plus the pre-versioning umbrella.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// Seeded once at install from the asset manifest.
    Static,
    /// Populated opportunistically from successful network responses.
    Dynamic,
    /// Umbrella partition from before versioned naming.
    Legacy,
}

impl PartitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionKind::Static => "static",
            PartitionKind::Dynamic => "dynamic",
            PartitionKind::Legacy => "legacy",
        }
    }
}

/// An immutable copy of a successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub request_key: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl Snapshot {
    /// Build a snapshot stamped with the current time.
    pub fn new(request_key: String, url: String, status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self { request_key, url, status, content_type, body, stored_at: chrono::Utc::now().to_rfc3339() }
    }
}

impl CacheDb {
    /// Create a partition if it doesn't already exist.
    pub async fn open_partition(&self, name: &str, kind: PartitionKind) -> Result<(), Error> {
        let name = name.to_string();
        let kind = kind.as_str();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO partitions (name, kind, created_at) VALUES (?1, ?2, ?3)",
                    params![name, kind, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List every existing partition name.
    pub async fn list_partitions(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a partition and, by cascade, all of its entries.
    ///
    /// Returns true if the partition existed.
    pub async fn delete_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a snapshot in a partition.
    ///
    /// The partition row is created lazily so opportunistic writes never
    /// race against an explicit open. Uses UPSERT semantics on
    /// (partition, request_key).
    pub async fn put_entry(&self, partition: &str, kind: PartitionKind, snapshot: &Snapshot) -> Result<(), Error> {
        let partition = partition.to_string();
        let kind = kind.as_str();
        let snapshot = snapshot.clone();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO partitions (name, kind, created_at) VALUES (?1, ?2, ?3)",
                    params![partition, kind, created_at],
                )?;
                conn.execute(
                    "INSERT INTO entries (partition, request_key, url, status, content_type, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(partition, request_key) DO UPDATE SET
                        url = excluded.url,
                        status = excluded.status,
                        content_type = excluded.content_type,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        partition,
                        snapshot.request_key,
                        snapshot.url,
                        snapshot.status as i64,
                        snapshot.content_type,
                        snapshot.body,
                        snapshot.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a snapshot from one specific partition.
    ///
    /// Returns None if the partition has no entry for the key.
    pub async fn get_entry(&self, partition: &str, request_key: &str) -> Result<Option<Snapshot>, Error> {
        let partition = partition.to_string();
        let request_key = request_key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Snapshot>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT request_key, url, status, content_type, body, stored_at
                     FROM entries WHERE partition = ?1 AND request_key = ?2",
                )?;

                let result = stmt.query_row(params![partition, request_key], snapshot_from_row);

                match result {
                    Ok(s) => Ok(Some(s)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look a request key up across every partition, first match wins.
    pub async fn match_entry(&self, request_key: &str) -> Result<Option<Snapshot>, Error> {
        let request_key = request_key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Snapshot>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT request_key, url, status, content_type, body, stored_at
                     FROM entries WHERE request_key = ?1 ORDER BY partition LIMIT 1",
                )?;

                let result = stmt.query_row(params![request_key], snapshot_from_row);

                match result {
                    Ok(s) => Ok(Some(s)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// URLs of every entry in a partition, sorted.
    pub async fn entry_urls(&self, partition: &str) -> Result<Vec<String>, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE partition = ?1 ORDER BY url")?;
                let urls = stmt
                    .query_map(params![partition], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a partition.
    pub async fn count_entries(&self, partition: &str) -> Result<u64, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE partition = ?1",
                    params![partition],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

fn snapshot_from_row(row: &rusqlite::Row<'_>) -> Result<Snapshot, rusqlite::Error> {
    Ok(Snapshot {
        request_key: row.get(0)?,
        url: row.get(1)?,
        status: row.get::<_, i64>(2)? as u16,
        content_type: row.get(3)?,
        body: row.get(4)?,
        stored_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::request_key;

    fn make_snapshot(url: &str) -> Snapshot {
        Snapshot::new(
            request_key("GET", url),
            url.to_string(),
            200,
            Some("text/html".to_string()),
            b"<html>ok</html>".to_vec(),
        )
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let snapshot = make_snapshot("https://example.com/");

        db.put_entry("static-v1", PartitionKind::Static, &snapshot).await.unwrap();

        let retrieved = db
            .get_entry("static-v1", &snapshot.request_key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.url, snapshot.url);
        assert_eq!(retrieved.status, 200);
        assert_eq!(retrieved.body, snapshot.body);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.get_entry("static-v1", "nonexistent").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_upserts() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut snapshot = make_snapshot("https://example.com/");

        db.put_entry("dynamic-v1", PartitionKind::Dynamic, &snapshot).await.unwrap();
        snapshot.body = b"<html>newer</html>".to_vec();
        db.put_entry("dynamic-v1", PartitionKind::Dynamic, &snapshot).await.unwrap();

        let retrieved = db
            .get_entry("dynamic-v1", &snapshot.request_key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.body, b"<html>newer</html>".to_vec());
        assert_eq!(db.count_entries("dynamic-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_match_across_partitions() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let snapshot = make_snapshot("https://example.com/page");

        db.put_entry("dynamic-v1", PartitionKind::Dynamic, &snapshot).await.unwrap();

        let matched = db.match_entry(&snapshot.request_key).await.unwrap();
        assert!(matched.is_some());
        assert!(db.match_entry("missing-key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_partition_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let snapshot = make_snapshot("https://example.com/");

        db.put_entry("static-v1", PartitionKind::Static, &snapshot).await.unwrap();
        assert!(db.delete_partition("static-v1").await.unwrap());

        assert!(!db.list_partitions().await.unwrap().contains(&"static-v1".to_string()));
        assert!(db.match_entry(&snapshot.request_key).await.unwrap().is_none());
        assert!(!db.delete_partition("static-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_partitions() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_partition("static-v1", PartitionKind::Static).await.unwrap();
        db.open_partition("dynamic-v1", PartitionKind::Dynamic).await.unwrap();
        db.open_partition("static-v1", PartitionKind::Static).await.unwrap();

        let names = db.list_partitions().await.unwrap();
        assert_eq!(names, vec!["dynamic-v1".to_string(), "static-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_entry_urls() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_entry("static-v1", PartitionKind::Static, &make_snapshot("https://example.com/"))
            .await
            .unwrap();
        db.put_entry("static-v1", PartitionKind::Static, &make_snapshot("https://example.com/manifest.json"))
            .await
            .unwrap();

        let urls = db.entry_urls("static-v1").await.unwrap();
        assert_eq!(urls, vec![
            "https://example.com/".to_string(),
            "https://example.com/manifest.json".to_string()
        ]);
    }
}
