//! Core types and shared functionality for vigil.
//!
//! This crate provides:
//! - Versioned cache-partition store with SQLite backend
//! - Durable outbox store for deferred mutations
//! - Unified error types
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod outbox;
mod store;

pub use cache::{CacheDb, PartitionKind, Snapshot};
pub use config::AppConfig;
pub use error::Error;
pub use outbox::{Category, OutboxDb, OutboxRecord};
