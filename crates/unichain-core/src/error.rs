//! # Error Types
//!
//! Errors shared by every crate in the workspace. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! Ledger-specific failures (`AppendError`, `RevokeError`, ...) live next to
//! the code that raises them in `unichain-ledger`; this module only holds the
//! categories that cross crate boundaries.

use thiserror::Error;

/// Top-level error type for the UniChain workspace.
#[derive(Error, Debug)]
pub enum UniChainError {
    /// A value could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest parsing or computation failed.
    #[error("digest error: {0}")]
    DigestError(String),
}

/// Error constructing a domain identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The identifier was empty or whitespace only.
    #[error("{kind} must not be empty")]
    Empty {
        /// Which identifier kind was rejected.
        kind: &'static str,
    },
}
