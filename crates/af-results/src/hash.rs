//! Content-based fingerprints for normalized result payloads.

use sha2::{Digest, Sha256};

use crate::ResultData;

/// SHA-256 hex digest of the canonical JSON form of `result`.
///
/// Maps are ordered, so identical payloads always hash identically. Non-finite
/// samples serialize as `null` and therefore collide with each other.
///
/// Serializing a `ResultData` cannot fail: every map is keyed by `String` and
/// every value is a plain number, string or nested record.
pub fn payload_fingerprint(result: &ResultData) -> String {
    let mut hasher = Sha256::new();

    let json = serde_json::to_string(result).unwrap_or_default();
    hasher.update(json.as_bytes());

    format!("{:x}", hasher.finalize())
}
