use thiserror::Error;
use unichain_core::CanonicalizationError;
use unichain_crypto::MerkleError;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    #[error("credential serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    /// None of the requested fields matched a credential attribute.
    #[error("no credential attribute matches {fields:?}")]
    NothingRevealed { fields: Vec<String> },
}
