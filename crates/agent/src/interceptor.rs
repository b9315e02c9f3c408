//! Fetch interception: classification, cache-first reads, offline fallback.

use crate::agent::OfflineAgent;
use crate::error::Error;
use vigil_client::{Bytes, Method, Request, Response, StatusCode, same_origin};
use vigil_core::cache::request_key;
use vigil_core::{PartitionKind, Snapshot};

/// Structured body served for API requests when the network is down, so
/// callers can tell "the server rejected this" from "there is no network".
const OFFLINE_API_BODY: &[u8] = br#"{"success":false,"error":"offline","offline":true}"#;

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Snapshot from a cache partition; no network round-trip was made.
    Cache,
    /// Live response from the origin server.
    Network,
    /// Synthesized or reserved offline fallback.
    Fallback,
}

/// A response the interceptor decided to serve, with its provenance.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: Source,
}

impl OfflineAgent {
    /// Decide how to satisfy one outgoing request.
    ///
    /// Non-GET and cross-origin requests pass straight through: no caching
    /// side effect, no fallback, transport errors propagate unchanged. For
    /// same-origin GETs the policy is cache-first; a miss goes to the
    /// network, and a network failure enters the offline-fallback branch.
    /// `Ok(None)` means this layer has no answer and the platform's default
    /// network-error behavior stands.
    pub async fn on_fetch(&self, request: &Request) -> Result<Option<Served>, Error> {
        if request.method != Method::GET || !same_origin(&request.url, &self.origin) {
            let response = self.net.fetch(request).await?;
            return Ok(Some(Served { response, source: Source::Network }));
        }

        let key = self.key_for(request);
        if let Some(snapshot) = self.cache.match_entry(&key).await? {
            tracing::trace!(url = %request.url, "serving cached snapshot");
            return Ok(Some(Served { response: response_from(&snapshot), source: Source::Cache }));
        }

        match self.net.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.store_dynamic(key, request.url.as_str(), &response);
                }
                Ok(Some(Served { response, source: Source::Network }))
            }
            Err(err) => {
                tracing::debug!(url = %request.url, %err, "network failed, entering offline fallback");
                self.offline_fallback(request).await
            }
        }
    }

    /// Snapshot key for a request, with the fragment stripped.
    fn key_for(&self, request: &Request) -> String {
        let mut url = request.url.clone();
        url.set_fragment(None);
        request_key(request.method.as_str(), url.as_str())
    }

    /// Best-effort side task: snapshot a successful response into the
    /// dynamic partition. Never awaited by the caller; a store failure is
    /// logged and discarded so it cannot block or fail the response.
    fn store_dynamic(&self, key: String, url: &str, response: &Response) {
        let snapshot = Snapshot::new(
            key,
            url.to_string(),
            response.status.as_u16(),
            response.content_type.clone(),
            response.bytes.to_vec(),
        );
        let cache = self.cache.clone();
        let partition = self.config.dynamic_partition();
        tokio::spawn(async move {
            if let Err(err) = cache.put_entry(&partition, PartitionKind::Dynamic, &snapshot).await {
                tracing::warn!(partition = %partition, %err, "best-effort dynamic store failed");
            }
        });
    }

    async fn offline_fallback(&self, request: &Request) -> Result<Option<Served>, Error> {
        if request.is_navigation() {
            let offline_url = self.asset_url(&self.config.offline_path)?;
            let key = request_key("GET", offline_url.as_str());
            if let Some(snapshot) = self.cache.match_entry(&key).await? {
                return Ok(Some(Served { response: response_from(&snapshot), source: Source::Fallback }));
            }
            tracing::warn!("offline document missing from cache, no fallback to serve");
            return Ok(None);
        }

        if request.url.path().starts_with(&self.config.api_prefix) {
            let response = Response::new(
                StatusCode::SERVICE_UNAVAILABLE,
                Some("application/json".to_string()),
                Bytes::from_static(OFFLINE_API_BODY),
            );
            return Ok(Some(Served { response, source: Source::Fallback }));
        }

        Ok(None)
    }
}

/// Rehydrate a stored snapshot into a response.
fn response_from(snapshot: &Snapshot) -> Response {
    Response::new(
        StatusCode::from_u16(snapshot.status).unwrap_or(StatusCode::OK),
        snapshot.content_type.clone(),
        Bytes::from(snapshot.body.clone()),
    )
}
