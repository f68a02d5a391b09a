//! # Blocks
//!
//! A block wraps exactly one transaction and links to its predecessor by
//! hash. Construction is two-phase: [`UnsignedBlock::build`] fixes every
//! field except the proposer signature, and [`UnsignedBlock::sign`] produces
//! the immutable [`Block`]. Only a `Block` can be hashed, so a block hash is
//! never computed before the signature exists.
//!
//! The block hash is derived on demand and never stored. It covers the
//! canonical encoding of every field, signature included.

use serde::{Deserialize, Serialize};
use unichain_core::{
    sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, ParticipantId, Timestamp,
};
use unichain_crypto::{sha256_raw, Ed25519PublicKey, Ed25519Signature, Signer};

use crate::transaction::{Transaction, TransactionError, TransactionKind};

/// `previousHash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// `proposerId` of the genesis block.
pub const GENESIS_PROPOSER: &str = "genesis";

/// Every block field except the proposer signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedBlock {
    format_version: String,
    previous_hash: String,
    timestamp: Timestamp,
    transaction_type: TransactionKind,
    transaction: Transaction,
    tx_root: ContentDigest,
    attributes_merkle_root: Option<ContentDigest>,
    proposer_id: ParticipantId,
}

/// A committed (or committable) block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(flatten)]
    body: UnsignedBlock,
    signature: Option<Ed25519Signature>,
}

/// `txRoot`: SHA-256 over the hex text of the transaction content hash.
pub fn tx_root(transaction: &Transaction) -> ContentDigest {
    sha256_raw(transaction.content_hash().to_hex().as_bytes())
}

impl UnsignedBlock {
    /// Assemble a candidate block timestamped now.
    pub fn build(
        previous_hash: impl Into<String>,
        transaction: Transaction,
        proposer_id: ParticipantId,
        attributes_merkle_root: Option<ContentDigest>,
        format_version: impl Into<String>,
    ) -> Self {
        Self::build_at(
            previous_hash,
            transaction,
            proposer_id,
            attributes_merkle_root,
            format_version,
            Timestamp::now(),
        )
    }

    fn build_at(
        previous_hash: impl Into<String>,
        transaction: Transaction,
        proposer_id: ParticipantId,
        attributes_merkle_root: Option<ContentDigest>,
        format_version: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            format_version: format_version.into(),
            previous_hash: previous_hash.into(),
            timestamp,
            transaction_type: transaction.kind(),
            tx_root: tx_root(&transaction),
            transaction,
            attributes_merkle_root,
            proposer_id,
        }
    }

    /// Canonical encoding of every field; the input to the proposer signature.
    pub fn payload_to_sign(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// Sign the payload and seal the block.
    pub fn sign<S: Signer + ?Sized>(self, proposer: &S) -> Result<Block, CanonicalizationError> {
        let signature = proposer.sign(&self.payload_to_sign()?);
        Ok(Block {
            body: self,
            signature: Some(signature),
        })
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }
}

impl Block {
    /// The fixed first block: epoch timestamp, sentinel issuance, no signature.
    pub fn genesis(format_version: &str) -> Result<Self, TransactionError> {
        let transaction = Transaction::create(
            TransactionKind::Issuance,
            GENESIS_PROPOSER,
            GENESIS_PROPOSER,
            GENESIS_PROPOSER,
        )?;
        let proposer_id = ParticipantId::new(GENESIS_PROPOSER).map_err(|_| {
            TransactionError::Malformed {
                field: "proposerId",
            }
        })?;
        let body = UnsignedBlock::build_at(
            GENESIS_PREVIOUS_HASH,
            transaction,
            proposer_id,
            None,
            format_version,
            Timestamp::epoch(),
        );
        Ok(Self {
            body,
            signature: None,
        })
    }

    /// SHA-256 over the canonical encoding of all fields including the
    /// signature.
    pub fn hash(&self) -> Result<ContentDigest, CanonicalizationError> {
        Ok(sha256_digest(&CanonicalBytes::new(self)?))
    }

    /// Recompute the unsigned payload and check the proposer signature.
    pub fn verify_signature(&self, proposer_public_key: &Ed25519PublicKey) -> bool {
        let Some(signature) = &self.signature else {
            return false;
        };
        let Ok(payload) = self.body.payload_to_sign() else {
            return false;
        };
        proposer_public_key.verify(&payload, signature).is_ok()
    }

    /// `txRoot` agrees with the embedded transaction.
    pub fn is_tx_root_consistent(&self) -> bool {
        self.body.tx_root == tx_root(&self.body.transaction)
    }

    pub fn is_genesis(&self) -> bool {
        self.body.previous_hash == GENESIS_PREVIOUS_HASH
            && self.body.proposer_id.as_str() == GENESIS_PROPOSER
            && self.signature.is_none()
    }

    pub fn format_version(&self) -> &str {
        &self.body.format_version
    }

    pub fn previous_hash(&self) -> &str {
        &self.body.previous_hash
    }

    pub fn timestamp(&self) -> Timestamp {
        self.body.timestamp
    }

    pub fn transaction_type(&self) -> TransactionKind {
        self.body.transaction_type
    }

    pub fn transaction(&self) -> &Transaction {
        &self.body.transaction
    }

    pub fn tx_root(&self) -> &ContentDigest {
        &self.body.tx_root
    }

    pub fn attributes_merkle_root(&self) -> Option<&ContentDigest> {
        self.body.attributes_merkle_root.as_ref()
    }

    pub fn proposer_id(&self) -> &ParticipantId {
        &self.body.proposer_id
    }

    pub fn signature(&self) -> Option<&Ed25519Signature> {
        self.signature.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unichain_crypto::Ed25519KeyPair;

    fn pid(s: &str) -> ParticipantId {
        ParticipantId::new(s).unwrap()
    }

    fn signed_block(kp: &Ed25519KeyPair) -> Block {
        let tx = Transaction::create(TransactionKind::Issuance, "abc", "CAD-1", "w1")
            .unwrap()
            .sign(kp)
            .unwrap();
        let ts = Timestamp::parse("2024-07-01T09:30:45Z").unwrap();
        UnsignedBlock::build_at("ff", tx, pid("uni-a"), None, "1.0", ts)
            .sign(kp)
            .unwrap()
    }

    #[test]
    fn genesis_is_fixed() {
        let a = Block::genesis("1.0").unwrap();
        let b = Block::genesis("1.0").unwrap();
        assert_eq!(a.hash().unwrap(), b.hash().unwrap());
        assert!(a.is_genesis());
        assert_eq!(a.previous_hash(), "0");
        assert_eq!(a.timestamp(), Timestamp::epoch());
        assert!(a.signature().is_none());
    }

    #[test]
    fn hash_is_stable_and_covers_signature() {
        let kp = Ed25519KeyPair::from_seed(&[3u8; 32]);
        let block = signed_block(&kp);
        assert_eq!(block.hash().unwrap(), block.hash().unwrap());

        let mut other = block.clone();
        other.signature = Some(Ed25519Signature::from_bytes([0u8; 64]));
        assert_ne!(other.hash().unwrap(), block.hash().unwrap());
    }

    #[test]
    fn signature_verifies_under_proposer_key_only() {
        let kp = Ed25519KeyPair::generate();
        let block = signed_block(&kp);
        assert!(block.verify_signature(&kp.public_key()));
        assert!(!block.verify_signature(&Ed25519KeyPair::generate().public_key()));
        assert!(!Block::genesis("1.0").unwrap().verify_signature(&kp.public_key()));
    }

    #[test]
    fn tx_root_is_hash_of_content_hash_hex() {
        let kp = Ed25519KeyPair::generate();
        let block = signed_block(&kp);
        let expected = sha256_raw(block.transaction().content_hash().to_hex().as_bytes());
        assert_eq!(block.tx_root(), &expected);
        assert!(block.is_tx_root_consistent());
        assert_eq!(block.transaction_type(), TransactionKind::Issuance);
    }

    #[test]
    fn json_roundtrip_preserves_hash() {
        let kp = Ed25519KeyPair::generate();
        let block = signed_block(&kp);
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["previousHash"], "ff");
        assert_eq!(json["proposerId"], "uni-a");
        assert!(json["attributesMerkleRoot"].is_null());

        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back.hash().unwrap(), block.hash().unwrap());
        assert!(back.verify_signature(&kp.public_key()));
    }

    #[test]
    fn mutated_payload_fails_signature() {
        let kp = Ed25519KeyPair::generate();
        let mut json = serde_json::to_value(signed_block(&kp)).unwrap();
        json["formatVersion"] = serde_json::json!("2.0");
        let tampered: Block = serde_json::from_value(json).unwrap();
        assert!(!tampered.verify_signature(&kp.public_key()));
    }
}
