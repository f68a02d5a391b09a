//! # Selective Disclosure
//!
//! A holder proves a subset of credential attributes without handing over
//! the whole document. The bundle carries each revealed value, its inclusion
//! proof against the attribute root, and the holder's signature over that
//! root. A verifier then checks the root against the issuance block on the
//! ledger (see [`crate::verify`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unichain_core::{CanonicalBytes, ContentDigest, CredentialId, WalletAddress};
use unichain_crypto::{Ed25519PublicKey, Ed25519Signature, MerkleProof, Signer};

use crate::credential::AcademicCredential;
use crate::error::CredentialError;

/// Holder-built presentation of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationProof {
    pub credential_id: CredentialId,
    pub wallet_address: WalletAddress,
    /// Revealed values keyed by attribute label.
    pub revealed_attributes: BTreeMap<String, String>,
    /// Inclusion proof for every revealed label.
    pub merkle_proofs: BTreeMap<String, MerkleProof>,
    pub merkle_root: ContentDigest,
    /// Holder signature over the canonical encoding of `merkle_root`.
    pub signature: Ed25519Signature,
    pub public_key: Ed25519PublicKey,
}

impl PresentationProof {
    /// Reveal every attribute whose label ends with one of `reveal_fields`.
    ///
    /// Suffix matching is textual: `"grade"` selects
    /// `credential.credentialSubject.exams[0].grade` and every other label
    /// ending in `grade`.
    pub fn build<S: Signer + ?Sized>(
        credential_id: CredentialId,
        credential: &AcademicCredential,
        holder: &S,
        wallet_address: WalletAddress,
        reveal_fields: &[&str],
    ) -> Result<Self, CredentialError> {
        let leaves = credential.flatten_attributes()?;
        let tree = credential.attribute_tree()?;
        let merkle_root = tree.root();

        let mut revealed_attributes = BTreeMap::new();
        let mut merkle_proofs = BTreeMap::new();
        for leaf in leaves {
            if !reveal_fields.iter().any(|f| leaf.label.ends_with(f)) {
                continue;
            }
            merkle_proofs.insert(leaf.label.clone(), tree.proof(&leaf.label)?);
            revealed_attributes.insert(leaf.label, leaf.value);
        }
        if revealed_attributes.is_empty() {
            return Err(CredentialError::NothingRevealed {
                fields: reveal_fields.iter().map(|f| f.to_string()).collect(),
            });
        }

        let signature = holder.sign(&CanonicalBytes::new(&merkle_root)?);
        tracing::debug!(
            credential = %credential_id,
            revealed = revealed_attributes.len(),
            "presentation built"
        );
        Ok(Self {
            credential_id,
            wallet_address,
            revealed_attributes,
            merkle_proofs,
            merkle_root,
            signature,
            public_key: holder.public_key(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use unichain_core::Timestamp;
    use unichain_crypto::{Ed25519KeyPair, MerkleAccumulator};

    use crate::credential::wallet_address;

    fn credential() -> AcademicCredential {
        AcademicCredential {
            credential_type: vec!["VerifiableCredential".into()],
            issuer: "uni-salerno".into(),
            issuance_date: Timestamp::parse("2024-02-10T12:00:00Z").unwrap(),
            credential_subject: json!({
                "name": "Alice",
                "exams": [
                    {"course": "Algorithms", "grade": 28},
                    {"course": "Networks", "grade": 30},
                ],
            }),
        }
    }

    fn present(fields: &[&str]) -> Result<PresentationProof, CredentialError> {
        let holder = Ed25519KeyPair::from_seed(&[9u8; 32]);
        PresentationProof::build(
            CredentialId::new("CAD-7").unwrap(),
            &credential(),
            &holder,
            wallet_address(&holder.public_key()),
            fields,
        )
    }

    #[test]
    fn suffix_selects_all_matching_labels() {
        let p = present(&["grade"]).unwrap();
        let labels: Vec<&str> = p.revealed_attributes.keys().map(String::as_str).collect();
        assert_eq!(
            labels,
            vec![
                "credential.credentialSubject.exams[0].grade",
                "credential.credentialSubject.exams[1].grade",
            ]
        );
        assert_eq!(p.revealed_attributes.len(), p.merkle_proofs.len());
        assert!(!p.revealed_attributes.values().any(|v| v == "Alice"));
    }

    #[test]
    fn proofs_verify_against_root() {
        let p = present(&["name", "course"]).unwrap();
        assert_eq!(p.merkle_root, credential().merkle_root().unwrap());
        for (label, value) in &p.revealed_attributes {
            let proof = &p.merkle_proofs[label];
            assert!(MerkleAccumulator::verify_proof(value, proof, &p.merkle_root));
        }
    }

    #[test]
    fn holder_signature_covers_root() {
        let p = present(&["name"]).unwrap();
        let data = CanonicalBytes::new(&p.merkle_root).unwrap();
        assert!(p.public_key.verify(&data, &p.signature).is_ok());
    }

    #[test]
    fn no_match_is_an_error() {
        assert!(matches!(
            present(&["thesis"]),
            Err(CredentialError::NothingRevealed { .. })
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let p = present(&["grade"]).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"revealedAttributes\""));
        let back: PresentationProof = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
