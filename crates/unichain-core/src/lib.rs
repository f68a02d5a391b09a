//! # unichain-core: Foundational Types for the UniChain Ledger
//!
//! The leaf crate of the workspace. Every other `unichain-*` crate depends on
//! it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every hash and every signature input in
//!    the ledger flows through `CanonicalBytes::new()` (RFC 8785 JCS). There
//!    is exactly one canonical encoding, so two independent implementations
//!    hashing the same transaction or block produce the same bytes.
//!
//! 2. **`sha256_digest()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that structured data is canonicalized before hashing.
//!
//! 3. **Newtype identifiers.** `ParticipantId`, `CredentialId`, and
//!    `WalletAddress` are distinct types with validated constructors.
//!
//! 4. **UTC-only timestamps.** `Timestamp` is seconds precision with a `Z`
//!    suffix, matching the canonicalization rules.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `unichain-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CryptoError, IdentityError, UniChainError};
pub use identity::{CredentialId, ParticipantId, WalletAddress};
pub use temporal::Timestamp;
