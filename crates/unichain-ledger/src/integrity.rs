//! # Chain Integrity
//!
//! Full-scan verification of a block sequence. For every block after
//! genesis: the `previousHash` link, the transaction content hash, the
//! `txRoot`, and the proposer signature under the key the PKI holds for
//! the proposer. The first failure is reported.

use thiserror::Error;

use crate::block::Block;
use crate::pki::PkiRegistry;
use crate::replica::head_link;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// The sequence does not start with a genesis block.
    #[error("chain does not start with a genesis block")]
    MissingGenesis,

    /// `previousHash` does not match the hash of the preceding block.
    #[error("block {index}: previousHash does not link to its predecessor")]
    ChainLinkage { index: usize },

    /// A stored hash (or the `transactionType` copy) disagrees with the
    /// value recomputed from the block.
    #[error("block {index}: {field} does not match recomputed value")]
    HashMismatch { index: usize, field: &'static str },

    /// The proposer signature is missing, the proposer has no registered
    /// key, or the signature does not verify.
    #[error("block {index}: invalid proposer signature")]
    InvalidSignature { index: usize },
}

/// Verify `blocks` from genesis to head.
pub fn verify_chain(blocks: &[Block], pki: &dyn PkiRegistry) -> Result<(), IntegrityViolation> {
    match blocks.first() {
        Some(genesis) if genesis.is_genesis() => {}
        _ => return Err(IntegrityViolation::MissingGenesis),
    }

    for (index, block) in blocks.iter().enumerate().skip(1) {
        let expected = head_link(&blocks[..index])
            .map_err(|_| IntegrityViolation::HashMismatch { index: index - 1, field: "blockHash" })?;
        if block.previous_hash() != expected {
            return Err(IntegrityViolation::ChainLinkage { index });
        }
        if !block.transaction().is_content_hash_consistent() {
            return Err(IntegrityViolation::HashMismatch { index, field: "contentHash" });
        }
        if block.transaction_type() != block.transaction().kind() {
            return Err(IntegrityViolation::HashMismatch { index, field: "transactionType" });
        }
        if !block.is_tx_root_consistent() {
            return Err(IntegrityViolation::HashMismatch { index, field: "txRoot" });
        }
        let verified = pki
            .public_key(block.proposer_id())
            .is_some_and(|key| block.verify_signature(&key));
        if !verified {
            return Err(IntegrityViolation::InvalidSignature { index });
        }
    }
    Ok(())
}
