//! SQLite-backed cache-partition store.
//!
//! This module provides the named, versioned cache partitions the fetch
//! interceptor reads from and writes to. It supports:
//!
//! - Partition naming with an embedded version token
//! - Snapshot lookup within one partition or across all of them
//! - Generation-based pruning (delete everything outside a keep-set)
//! - WAL mode for concurrent access

pub mod connection;
pub mod key;
pub mod migrations;
pub mod partitions;

pub use crate::Error;

pub use connection::CacheDb;
pub use key::request_key;
pub use partitions::{PartitionKind, Snapshot};

/// Umbrella partition name kept for pre-versioning installs.
pub const LEGACY_PARTITION: &str = "vigil-cache";

/// Name of the static partition for a version token.
pub fn static_partition(version: &str) -> String {
    format!("static-{version}")
}

/// Name of the dynamic partition for a version token.
pub fn dynamic_partition(version: &str) -> String {
    format!("dynamic-{version}")
}
