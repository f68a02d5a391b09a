//! # unichain-crypto: Cryptographic Primitives
//!
//! - **Ed25519** signing and verification for transactions, blocks, and
//!   holder signatures over Merkle roots.
//! - **SHA-256** over raw bytes, for the places where the hashed input is
//!   text rather than a structured record (Merkle leaves and nodes, wallet
//!   addresses).
//! - **Merkle accumulator** over ordered `(label, value)` leaves with
//!   per-label inclusion proofs.
//!
//! ## Crate Policy
//!
//! - Depends only on `unichain-core` internally.
//! - No mocking of cryptographic operations in tests: real SHA-256, real
//!   Ed25519.

pub mod ed25519;
pub mod merkle;
pub mod sha256;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, Signer};
pub use merkle::{MerkleAccumulator, MerkleError, MerkleProof, ProofStep, Side};
pub use sha256::{sha256_raw, sha256_raw_hex};
