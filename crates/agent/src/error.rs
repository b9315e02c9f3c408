//! Structured errors for the offline agent.

use vigil_core::Category;

/// Errors surfaced by the agent's entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Storage layer failure.
    #[error("store error: {0}")]
    Store(#[from] vigil_core::Error),

    /// Transport-level network failure on a pass-through request.
    #[error("network error: {0}")]
    Network(#[from] vigil_client::NetError),

    /// The configured origin could not be parsed as a URL.
    #[error("invalid origin {origin}: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    /// A manifest path could not be joined onto the origin.
    #[error("invalid asset path {path}: {reason}")]
    InvalidAssetPath { path: String, reason: String },

    /// An enumerated static asset did not return 2xx during install.
    #[error("install failed: asset {url} returned status {status}")]
    InstallAsset { url: String, status: u16 },

    /// A replay batch was aborted; the outbox keeps the whole batch.
    #[error("sync aborted for {category}: {sent} of {total} records accepted")]
    SyncAborted { category: Category, sent: usize, total: usize },
}
