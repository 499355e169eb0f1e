use sha2::{Digest, Sha256};

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Full SHA-256 of a container, recorded as `fileHash` and checked again
/// before regeneration.
pub fn file_hash(bytes: &[u8]) -> String {
    sha256_hex(bytes)
}

/// Short fingerprint of one part: the first 16 hex digits of its SHA-256.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut full = sha256_hex(bytes);
    full.truncate(16);
    full
}
