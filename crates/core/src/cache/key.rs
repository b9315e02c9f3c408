//! Request identity hashing for snapshot lookup.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request.
///
/// The key is derived from the method and the already-canonicalized URL, so
/// two requests for the same resource always land on the same snapshot.
/// Only GET requests are ever snapshotted, but the method participates in
/// the key so the derivation stays total.
pub fn request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
