//! The `OfflineAgent` state machine and its construction.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use url::Url;

use crate::error::Error;
use crate::lifecycle::LifecycleState;
use vigil_client::{Network, canonicalize};
use vigil_core::{AppConfig, CacheDb, Category, OutboxDb};

/// Per-category locks serializing drain+replay+clear.
///
/// Two overlapping reconciliations of one category must not interleave
/// their clear operations.
pub(crate) struct SyncGates {
    bookmarks: Mutex<()>,
    search_history: Mutex<()>,
}

impl SyncGates {
    fn new() -> Self {
        Self { bookmarks: Mutex::new(()), search_history: Mutex::new(()) }
    }

    pub(crate) fn gate(&self, category: Category) -> &Mutex<()> {
        match category {
            Category::Bookmarks => &self.bookmarks,
            Category::SearchHistory => &self.search_history,
        }
    }
}

/// The offline resilience agent.
///
/// Owns the cache-partition store, the durable outbox, and the injected
/// network capability. All entry points are `&self`; the hosting adapter
/// may share one instance across tasks.
pub struct OfflineAgent {
    pub(crate) config: AppConfig,
    pub(crate) origin: Url,
    pub(crate) cache: CacheDb,
    pub(crate) outbox: OutboxDb,
    pub(crate) net: Arc<dyn Network>,
    pub(crate) state: std::sync::Mutex<LifecycleState>,
    pub(crate) skip_waiting: AtomicBool,
    pub(crate) clients_claimed: AtomicBool,
    pub(crate) sync_gates: SyncGates,
}

impl OfflineAgent {
    /// Build an agent from validated configuration and opened stores.
    pub fn new(config: AppConfig, cache: CacheDb, outbox: OutboxDb, net: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = canonicalize(&config.origin)
            .map_err(|e| Error::InvalidOrigin { origin: config.origin.clone(), reason: e.to_string() })?;

        Ok(Self {
            config,
            origin,
            cache,
            outbox,
            net,
            state: std::sync::Mutex::new(LifecycleState::Idle),
            skip_waiting: AtomicBool::new(false),
            clients_claimed: AtomicBool::new(false),
            sync_gates: SyncGates::new(),
        })
    }

    /// The origin this agent fronts.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn set_state(&self, next: LifecycleState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// Whether install signalled readiness to supersede a waiting version.
    pub fn skip_waiting_signalled(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Whether activation took control of open clients.
    pub fn clients_claimed(&self) -> bool {
        self.clients_claimed.load(Ordering::SeqCst)
    }

    /// Record a mutation for deferred delivery.
    ///
    /// Called by the application when a mutating action cannot reach the
    /// network. The payload is opaque to this layer. A store failure
    /// propagates: the caller is the only one who can tell the user the
    /// action was not saved.
    pub async fn enqueue(&self, category: Category, payload: &serde_json::Value) -> Result<i64, Error> {
        let id = self.outbox.enqueue(category, payload).await?;
        tracing::debug!(category = %category, id, "queued offline mutation");
        Ok(id)
    }

    /// Resolve an origin-relative path to an absolute URL.
    pub(crate) fn asset_url(&self, path: &str) -> Result<Url, Error> {
        self.origin
            .join(path)
            .map_err(|e| Error::InvalidAssetPath { path: path.to_string(), reason: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedNetwork, test_agent};
    use serde_json::json;

    #[tokio::test]
    async fn test_new_rejects_bad_origin() {
        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        let cache = CacheDb::open_in_memory().await.unwrap();
        let outbox = OutboxDb::open_in_memory().await.unwrap();

        let result = OfflineAgent::new(config, cache, outbox, Arc::new(ScriptedNetwork::new()));
        assert!(matches!(result, Err(Error::InvalidOrigin { .. })));
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (agent, _, _) = test_agent(Arc::new(ScriptedNetwork::new())).await;
        assert_eq!(agent.state(), LifecycleState::Idle);
        assert!(!agent.skip_waiting_signalled());
        assert!(!agent.clients_claimed());
    }

    #[tokio::test]
    async fn test_enqueue_is_durable_immediately() {
        let (agent, _, outbox) = test_agent(Arc::new(ScriptedNetwork::new())).await;

        agent.enqueue(Category::Bookmarks, &json!({"url": "/rights/housing"})).await.unwrap();

        assert_eq!(outbox.count(Category::Bookmarks).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_asset_url_joins_origin() {
        let (agent, _, _) = test_agent(Arc::new(ScriptedNetwork::new())).await;
        let url = agent.asset_url("/manifest.json").unwrap();
        assert_eq!(url.as_str(), "https://app.test/manifest.json");
    }
}
