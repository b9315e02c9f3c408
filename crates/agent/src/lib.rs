//! Offline resilience agent for the vigil application.
//!
//! The `OfflineAgent` is an explicit state machine sitting between the
//! application and the network. The hosting adapter wires platform events to
//! its four entry points:
//!
//! - `on_install` — seed the static cache partition (all-or-nothing)
//! - `on_activate` — prune partitions from other versions
//! - `on_fetch` — serve reads cache-first with offline fallback
//! - `on_sync` — replay the durable outbox against the origin server

pub mod agent;
pub mod error;
pub mod interceptor;
pub mod lifecycle;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::OfflineAgent;
pub use error::Error;
pub use interceptor::{Served, Source};
pub use lifecycle::LifecycleState;
pub use reconciler::SyncReport;
