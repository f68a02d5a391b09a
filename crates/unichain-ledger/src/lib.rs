//! # unichain-ledger: Credential Ledger Engine
//!
//! Anchors issuance and revocation events for academic credentials on an
//! append-only, hash-linked chain of signed blocks.
//!
//! - [`transaction`]: issuance/revocation records with a deterministic
//!   content hash and a detached issuer signature.
//! - [`block`]: two-phase block construction (`UnsignedBlock` → `Block`),
//!   derived block hash, proposer signature.
//! - [`ledger`]: the chain itself, quorum-gated `append`, revocation, and
//!   status resolution.
//! - [`quorum`]: the pure `2f + 1` admission rule.
//! - [`pki`] / [`replica`]: collaborator traits for accreditation and
//!   replica validation, with in-memory implementations.
//! - [`integrity`]: full-chain verification.
//! - [`config`]: `LedgerConfig` from defaults, YAML, and environment.
//!
//! ## Crate Policy
//!
//! - The chain is mutated in exactly one place, `Ledger::commit`.
//! - Every failed mutation leaves the chain unchanged.
//! - No `.unwrap()` outside tests.

pub mod block;
pub mod config;
pub mod error;
pub mod integrity;
pub mod ledger;
pub mod pki;
pub mod quorum;
pub mod replica;
pub mod transaction;

pub use block::{Block, UnsignedBlock};
pub use config::{ConfigError, LedgerConfig};
pub use error::{AppendError, RevokeError};
pub use integrity::{verify_chain, IntegrityViolation};
pub use ledger::{BlockIndex, CredentialStatus, Ledger};
pub use pki::{Accreditation, AccreditationRegistry, Participant, PkiRegistry, Proposer};
pub use quorum::{AdmissionQuorum, QuorumOutcome};
pub use replica::{AutoAcceptReplica, ChainView, LocalReplica, Replica, ReplicaResponse};
pub use transaction::{Transaction, TransactionError, TransactionKind};
