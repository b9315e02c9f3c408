//! Origin-server network access for vigil.
//!
//! This crate provides the request/response model, URL canonicalization and
//! same-origin classification, and the `Network` seam the agent fetches
//! through.

pub mod fetch;
pub mod request;
pub mod url;

pub use fetch::{HttpNetwork, NetConfig, NetError, Network};
pub use request::{Destination, Request, Response};
pub use url::{UrlError, canonicalize, same_origin};

pub use bytes::Bytes;
pub use reqwest::{Method, StatusCode};
