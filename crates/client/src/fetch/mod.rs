//! Network seam and the reqwest-backed implementation.
//!
//! The `Network` trait is the only way the agent reaches the wire, which
//! keeps interception and replay logic testable without sockets. A non-2xx
//! response comes back as data, not as an error: the interceptor has to
//! distinguish "the server rejected this" from "there is no network", and
//! only transport-level failures are errors here.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

use crate::request::{Request, Response};

/// Transport-level failure classes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetError {
    /// Could not reach the origin (connection refused, DNS failure).
    #[error("origin unreachable: {0}")]
    Unreachable(String),

    /// The request timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Response body exceeded the configured limit.
    #[error("response too large: {got} bytes exceeds {limit}")]
    TooLarge { got: usize, limit: usize },

    /// The HTTP client itself could not be built or driven.
    #[error("client error: {0}")]
    Client(String),
}

/// Network capability the agent is constructed with.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request, returning whatever the origin answered.
    ///
    /// Any HTTP status is an Ok; Err means the wire itself failed.
    async fn fetch(&self, request: &Request) -> Result<Response, NetError>;
}

/// Configuration for the HTTP network client.
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// User agent string (default: "vigil/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            user_agent: "vigil/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// Reqwest-backed network implementation.
pub struct HttpNetwork {
    http: Client,
    config: NetConfig,
}

impl HttpNetwork {
    /// Create a new network client with the given configuration.
    pub fn new(config: NetConfig) -> Result<Self, NetError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| NetError::Client(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &NetConfig {
        &self.config
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        let start = Instant::now();

        let mut builder = self.http.request(request.method.clone(), request.url.as_str());
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                NetError::Timeout(e.to_string())
            } else {
                NetError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(NetError::TooLarge { got: len as usize, limit: self.config.max_bytes });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| NetError::Unreachable(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(NetError::TooLarge { got: bytes.len(), limit: self.config.max_bytes });
        }

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(Response::new(status, content_type, bytes))
    }
}
