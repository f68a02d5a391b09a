//! # unichain-vc: Academic Credentials and Verification
//!
//! - **Credential** (`credential.rs`): the `AcademicCredential` envelope,
//!   its content hash, and the deterministic flattening of its attributes
//!   into Merkle leaves.
//!
//! - **Presentation** (`presentation.rs`): holder-side selective disclosure.
//!   A `PresentationProof` reveals a subset of attributes together with
//!   their inclusion proofs and a holder signature over the attribute root.
//!
//! - **Verification** (`verify.rs`): the checks a verifier runs against a
//!   presentation and the ledger. Cryptographic checks return `bool`.
//!
//! ## Crate Policy
//!
//! - The credential hash is computed from `CanonicalBytes`; Merkle leaves
//!   are the flattened attribute strings.
//! - Holder signatures are Ed25519 over the canonical encoding of the root.

pub mod credential;
pub mod error;
pub mod presentation;
pub mod verify;

pub use credential::{wallet_address, AcademicCredential, FlatAttribute};
pub use error::CredentialError;
pub use presentation::PresentationProof;
pub use verify::{
    verify_attribute, verify_holder_bound, verify_presentation, verify_revocation_state,
    verify_root_anchored, verify_subject_signature, PresentationReport,
};
