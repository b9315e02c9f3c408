//! Request and response model for intercepted traffic.

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use url::Url;

/// What the requester intends to do with the response.
///
/// Only `Document` carries interception semantics (full-page navigation);
/// the remaining variants exist so callers can state intent without this
/// layer caring about the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Full-page navigation.
    Document,
    Script,
    Style,
    Image,
    /// Data request (API call, JSON body).
    Data,
    Other,
}

/// An outgoing request as seen by the interceptor.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    /// JSON body for mutating requests; GETs carry none.
    pub json_body: Option<serde_json::Value>,
}

impl Request {
    /// A plain GET request.
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, destination: Destination::Other, json_body: None }
    }

    /// A POST request with a JSON payload.
    pub fn post_json(url: Url, payload: serde_json::Value) -> Self {
        Self { method: Method::POST, url, destination: Destination::Data, json_body: Some(payload) }
    }

    /// Override the destination classification.
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Whether this request is a full-page navigation.
    pub fn is_navigation(&self) -> bool {
        self.destination == Destination::Document
    }
}

/// A response from the origin server, or a synthesized stand-in.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: StatusCode,
    /// Content-Type header.
    pub content_type: Option<String>,
    /// Response body bytes.
    pub bytes: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, content_type: Option<String>, bytes: Bytes) -> Self {
        Self { status, content_type, bytes }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_request_shape() {
        let req = Request::get(Url::parse("https://example.com/page").unwrap());
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.destination, Destination::Other);
        assert!(req.json_body.is_none());
        assert!(!req.is_navigation());
    }

    #[test]
    fn test_navigation_request() {
        let req = Request::get(Url::parse("https://example.com/").unwrap()).with_destination(Destination::Document);
        assert!(req.is_navigation());
    }

    #[test]
    fn test_post_json_request() {
        let req = Request::post_json(
            Url::parse("https://example.com/api/bookmarks").unwrap(),
            json!({"url": "/rights/housing"}),
        );
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.json_body, Some(json!({"url": "/rights/housing"})));
    }

    #[test]
    fn test_response_success() {
        let ok = Response::new(StatusCode::OK, None, Bytes::new());
        let missing = Response::new(StatusCode::NOT_FOUND, None, Bytes::new());
        assert!(ok.is_success());
        assert!(!missing.is_success());
    }
}
