//! # Credential Transactions
//!
//! A `Transaction` records one issuance or revocation of an academic
//! credential. Its `contentHash` is computed once, at construction, over
//! the canonical encoding of `{kind, credentialHash, credentialId,
//! subjectWalletAddress, revoked}`; the detached issuer signature covers
//! that hash and is never part of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unichain_core::{
    sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, CredentialId,
    WalletAddress,
};
use unichain_crypto::{Ed25519PublicKey, Ed25519Signature, Signer};

/// Errors constructing or signing a transaction.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// A required string field was empty or whitespace only.
    #[error("malformed transaction: {field} must not be empty")]
    Malformed { field: &'static str },

    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),
}

/// What a transaction does to its credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Issuance,
    Revocation,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issuance => "ISSUANCE",
            Self::Revocation => "REVOCATION",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issuance or revocation record for one credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    kind: TransactionKind,
    credential_hash: String,
    credential_id: CredentialId,
    subject_wallet_address: WalletAddress,
    revoked: bool,
    content_hash: ContentDigest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<Ed25519Signature>,
}

/// The hashed subset of a transaction.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentFields<'a> {
    kind: TransactionKind,
    credential_hash: &'a str,
    credential_id: &'a CredentialId,
    subject_wallet_address: &'a WalletAddress,
    revoked: bool,
}

impl Transaction {
    /// Build an unsigned transaction. `revoked` follows from `kind`.
    pub fn create(
        kind: TransactionKind,
        credential_hash: impl AsRef<str>,
        credential_id: impl AsRef<str>,
        subject_wallet_address: impl AsRef<str>,
    ) -> Result<Self, TransactionError> {
        let credential_hash = credential_hash.as_ref();
        if credential_hash.trim().is_empty() {
            return Err(TransactionError::Malformed {
                field: "credentialHash",
            });
        }
        let credential_id = CredentialId::new(credential_id.as_ref()).map_err(|_| {
            TransactionError::Malformed {
                field: "credentialId",
            }
        })?;
        let subject_wallet_address = WalletAddress::new(subject_wallet_address.as_ref())
            .map_err(|_| TransactionError::Malformed {
                field: "subjectWalletAddress",
            })?;

        let revoked = kind == TransactionKind::Revocation;
        let content_hash = content_hash(&ContentFields {
            kind,
            credential_hash,
            credential_id: &credential_id,
            subject_wallet_address: &subject_wallet_address,
            revoked,
        })?;

        Ok(Self {
            kind,
            credential_hash: credential_hash.to_string(),
            credential_id,
            subject_wallet_address,
            revoked,
            content_hash,
            signature: None,
        })
    }

    /// Attach the issuer's detached signature over `contentHash`.
    pub fn sign<S: Signer + ?Sized>(mut self, issuer: &S) -> Result<Self, TransactionError> {
        let payload = CanonicalBytes::new(&self.content_hash)?;
        self.signature = Some(issuer.sign(&payload));
        Ok(self)
    }

    /// `true` only if a signature is present and verifies under
    /// `issuer_public_key`.
    pub fn verify(&self, issuer_public_key: &Ed25519PublicKey) -> bool {
        let Some(signature) = &self.signature else {
            return false;
        };
        let Ok(payload) = CanonicalBytes::new(&self.content_hash) else {
            return false;
        };
        issuer_public_key.verify(&payload, signature).is_ok()
    }

    /// Recompute the content hash from the stored fields and compare.
    pub fn is_content_hash_consistent(&self) -> bool {
        let recomputed = content_hash(&ContentFields {
            kind: self.kind,
            credential_hash: &self.credential_hash,
            credential_id: &self.credential_id,
            subject_wallet_address: &self.subject_wallet_address,
            revoked: self.revoked,
        });
        matches!(recomputed, Ok(h) if h == self.content_hash)
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn credential_hash(&self) -> &str {
        &self.credential_hash
    }

    pub fn credential_id(&self) -> &CredentialId {
        &self.credential_id
    }

    pub fn subject_wallet_address(&self) -> &WalletAddress {
        &self.subject_wallet_address
    }

    pub fn revoked(&self) -> bool {
        self.revoked
    }

    pub fn content_hash(&self) -> &ContentDigest {
        &self.content_hash
    }

    pub fn signature(&self) -> Option<&Ed25519Signature> {
        self.signature.as_ref()
    }
}

fn content_hash(fields: &ContentFields<'_>) -> Result<ContentDigest, CanonicalizationError> {
    Ok(sha256_digest(&CanonicalBytes::new(fields)?))
}
