//! # Raw SHA-256
//!
//! Hashing of raw byte strings. Structured records go through
//! `unichain_core::sha256_digest` and `CanonicalBytes` instead; these helpers
//! exist for Merkle leaves (UTF-8 attribute values), Merkle nodes (the
//! concatenated hex of two children), and wallet addresses (public key bytes).

use sha2::{Digest, Sha256};
use unichain_core::{ContentDigest, DigestAlgorithm};

/// SHA-256 of raw bytes as a tagged digest.
pub fn sha256_raw(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(DigestAlgorithm::Sha256, bytes)
}

/// SHA-256 of raw bytes as lowercase hex.
pub fn sha256_raw_hex(data: &[u8]) -> String {
    sha256_raw(data).to_hex()
}
