//! One-way hashing of the client-identifying header bound into tokens.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the raw fingerprint (typically the `User-Agent`).
///
/// An absent fingerprint hashes to the empty string. Tokens carrying an empty
/// fingerprint hash never validate, so a client that sent no fingerprint at
/// login cannot use its token.
pub fn hash_fingerprint(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => hex::encode(Sha256::digest(raw.as_bytes())),
        None => String::new(),
    }
}
