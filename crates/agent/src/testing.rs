//! In-process test doubles: a scripted network and agent builders.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::agent::OfflineAgent;
use vigil_client::{Bytes, NetError, Network, Request, Response, StatusCode};
use vigil_core::{AppConfig, CacheDb, OutboxDb};

/// A 200 response with an HTML body.
pub(crate) fn html_response(body: &[u8]) -> Response {
    Response::new(StatusCode::OK, Some("text/html".to_string()), Bytes::copy_from_slice(body))
}

/// A 200 response with a JSON body.
pub(crate) fn json_response(body: &[u8]) -> Response {
    Response::new(StatusCode::OK, Some("application/json".to_string()), Bytes::copy_from_slice(body))
}

/// Scripted in-process `Network`: routes keyed by method + URL, an offline
/// switch, and a call counter so tests can assert on round-trips.
pub(crate) struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Result<Response, NetError>>>,
    offline: AtomicBool,
    calls: AtomicUsize,
    fail_from: AtomicUsize,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            fail_from: AtomicUsize::new(usize::MAX),
        }
    }

    /// Script a GET route.
    pub(crate) fn ok(&self, url: &str, response: Response) {
        self.respond("GET", url, Ok(response));
    }

    /// Script any route with a canned outcome.
    pub(crate) fn respond(&self, method: &str, url: &str, outcome: Result<Response, NetError>) {
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(format!("{method} {url}"), outcome);
    }

    /// Drop the wire entirely: every fetch fails at the transport level.
    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail every call whose zero-based index is >= `n`.
    pub(crate) fn fail_from(&self, n: usize) {
        self.fail_from.store(n, Ordering::SeqCst);
    }

    /// Restore the wire after `fail_from`.
    pub(crate) fn fail_never(&self) {
        self.fail_from.store(usize::MAX, Ordering::SeqCst);
    }

    /// Number of fetches that reached this network.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);

        if self.offline.load(Ordering::SeqCst) {
            return Err(NetError::Unreachable("scripted offline".to_string()));
        }
        if index >= self.fail_from.load(Ordering::SeqCst) {
            return Err(NetError::Unreachable("scripted transport failure".to_string()));
        }

        let key = format!("{} {}", request.method, request.url);
        match self.routes.lock().unwrap_or_else(|e| e.into_inner()).get(&key) {
            Some(outcome) => outcome.clone(),
            None => Ok(Response::new(StatusCode::NOT_FOUND, None, Bytes::new())),
        }
    }
}

/// Agent with in-memory stores and a three-asset manifest.
pub(crate) async fn test_agent(net: std::sync::Arc<ScriptedNetwork>) -> (OfflineAgent, CacheDb, OutboxDb) {
    test_agent_with(net, |_| {}).await
}

/// Same as [`test_agent`] with a config tweak applied before construction.
pub(crate) async fn test_agent_with(
    net: std::sync::Arc<ScriptedNetwork>, tweak: impl FnOnce(&mut AppConfig),
) -> (OfflineAgent, CacheDb, OutboxDb) {
    let mut config = AppConfig {
        origin: "https://app.test".to_string(),
        static_assets: vec!["/".to_string(), "/manifest.json".to_string(), "/offline.html".to_string()],
        ..Default::default()
    };
    tweak(&mut config);
    config.validate().expect("test config must validate");

    let cache = CacheDb::open_in_memory().await.expect("in-memory cache");
    let outbox = OutboxDb::open_in_memory().await.expect("in-memory outbox");

    let agent = OfflineAgent::new(config, cache.clone(), outbox.clone(), net).expect("agent construction");
    (agent, cache, outbox)
}
