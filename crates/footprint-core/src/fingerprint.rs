use sha2::{Digest, Sha256};

/// Stable cache key for a URL: lowercase hex SHA-256 of the URL text.
pub fn url_fingerprint(url: &str) -> String {
    let mut h = Sha256::new();
    h.update(url.as_bytes());
    hex::encode(h.finalize())
}
