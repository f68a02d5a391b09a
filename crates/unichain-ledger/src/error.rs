//! Errors raised by ledger mutations. Every variant leaves the chain
//! unchanged.

use thiserror::Error;
use unichain_core::{CanonicalizationError, CredentialId, ParticipantId};

use crate::transaction::TransactionError;

#[derive(Error, Debug)]
pub enum AppendError {
    /// The proposer holds no active accreditation.
    #[error("proposer {proposer} is not accredited")]
    UnaccreditedProposer { proposer: ParticipantId },

    /// The candidate's signature does not verify under the proposer's
    /// registered key.
    #[error("signature of proposer {proposer} does not verify under its registered key")]
    InvalidSignature { proposer: ParticipantId },

    /// Too few replicas accepted the candidate.
    #[error("consensus failure: {accepted} of {required} required acceptances")]
    ConsensusFailure { accepted: usize, required: usize },

    /// The head moved between building the candidate and committing it.
    #[error("chain linkage error: candidate links to {expected}, head is {found}")]
    ChainLinkage { expected: String, found: String },

    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),
}

#[derive(Error, Debug)]
pub enum RevokeError {
    #[error("credential {credential_id} not found on the ledger")]
    CredentialNotFound { credential_id: CredentialId },

    #[error("credential {credential_id} is already revoked")]
    AlreadyRevoked { credential_id: CredentialId },

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Append(#[from] AppendError),
}
