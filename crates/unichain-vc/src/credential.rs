//! # Academic Credential
//!
//! The credential document (CAD) a university issues to a student wallet.
//! The ledger never stores it: only its hash goes into the issuance
//! transaction and the Merkle root of its flattened attributes into the
//! block.
//!
//! ## Flattening
//!
//! The serialized credential is walked depth first under the prefix
//! `credential`. Object members are visited in sorted key order, array
//! elements in index order, so the same document always yields the same
//! leaf sequence:
//!
//! ```text
//! credential.credentialSubject.exams[0].grade  ->  "30"
//! credential.issuer                            ->  "uni-rennes"
//! ```
//!
//! Strings are used unquoted, `null` becomes `"null"`, numbers and booleans
//! their JSON text. Empty objects and arrays contribute no leaves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use unichain_core::{
    sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, Timestamp, WalletAddress,
};
use unichain_crypto::{sha256_raw, Ed25519PublicKey, MerkleAccumulator};

use crate::error::CredentialError;

const ROOT_LABEL: &str = "credential";

/// W3C-style academic credential envelope.
///
/// `credentialSubject` is free-form: degree, enrollment, exam records and
/// the like live there. Use integers or strings for numeric values; the
/// canonical encoding rejects floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicCredential {
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    pub issuer: String,
    pub issuance_date: Timestamp,
    pub credential_subject: Value,
}

/// One Merkle leaf: the attribute's path label and its rendered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatAttribute {
    pub label: String,
    pub value: String,
}

impl AcademicCredential {
    /// A credential issued now with the default type list.
    pub fn new(issuer: impl Into<String>, credential_subject: Value) -> Self {
        Self {
            credential_type: vec!["VerifiableCredential".into(), "AcademicCredential".into()],
            issuer: issuer.into(),
            issuance_date: Timestamp::now(),
            credential_subject,
        }
    }

    /// SHA-256 over the canonical encoding of the whole document.
    pub fn credential_hash(&self) -> Result<ContentDigest, CanonicalizationError> {
        Ok(sha256_digest(&CanonicalBytes::new(self)?))
    }

    /// Attribute leaves in deterministic order.
    pub fn flatten_attributes(&self) -> Result<Vec<FlatAttribute>, CredentialError> {
        let document = serde_json::to_value(self)?;
        let mut leaves = Vec::new();
        flatten(ROOT_LABEL.to_string(), &document, &mut leaves);
        Ok(leaves)
    }

    /// Merkle tree over [`flatten_attributes`](Self::flatten_attributes).
    pub fn attribute_tree(&self) -> Result<MerkleAccumulator, CredentialError> {
        let leaves = self.flatten_attributes()?;
        Ok(MerkleAccumulator::build(
            leaves.into_iter().map(|a| (a.label, a.value)),
        )?)
    }

    pub fn merkle_root(&self) -> Result<ContentDigest, CredentialError> {
        Ok(self.attribute_tree()?.root())
    }
}

fn flatten(label: String, value: &Value, out: &mut Vec<FlatAttribute>) {
    match value {
        Value::Object(members) => {
            let mut keys: Vec<&String> = members.keys().collect();
            keys.sort();
            for key in keys {
                flatten(format!("{label}.{key}"), &members[key], out);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(format!("{label}[{i}]"), item, out);
            }
        }
        Value::String(s) => out.push(FlatAttribute {
            label,
            value: s.clone(),
        }),
        scalar => out.push(FlatAttribute {
            label,
            value: scalar.to_string(),
        }),
    }
}

/// Wallet address for a holder key: SHA-256 of the raw public key bytes.
pub fn wallet_address(public_key: &Ed25519PublicKey) -> WalletAddress {
    WalletAddress::from_digest(&sha256_raw(public_key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use unichain_crypto::Ed25519KeyPair;

    fn sample() -> AcademicCredential {
        AcademicCredential {
            credential_type: vec!["VerifiableCredential".into(), "AcademicCredential".into()],
            issuer: "uni-rennes".into(),
            issuance_date: Timestamp::parse("2024-07-01T09:00:00Z").unwrap(),
            credential_subject: json!({
                "name": "Alice",
                "honors": null,
                "exams": [{"course": "Math", "grade": 30, "laude": true}],
            }),
        }
    }

    #[test]
    fn flattening_order_and_rendering() {
        let leaves = sample().flatten_attributes().unwrap();
        let pairs: Vec<(&str, &str)> = leaves
            .iter()
            .map(|a| (a.label.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("credential.credentialSubject.exams[0].course", "Math"),
                ("credential.credentialSubject.exams[0].grade", "30"),
                ("credential.credentialSubject.exams[0].laude", "true"),
                ("credential.credentialSubject.honors", "null"),
                ("credential.credentialSubject.name", "Alice"),
                ("credential.issuanceDate", "2024-07-01T09:00:00Z"),
                ("credential.issuer", "uni-rennes"),
                ("credential.type[0]", "VerifiableCredential"),
                ("credential.type[1]", "AcademicCredential"),
            ]
        );
    }

    #[test]
    fn empty_containers_add_no_leaves() {
        let mut cred = sample();
        cred.credential_subject = json!({"activities": [], "extra": {}});
        let labels: Vec<String> = cred
            .flatten_attributes()
            .unwrap()
            .into_iter()
            .map(|a| a.label)
            .collect();
        assert!(labels.iter().all(|l| !l.contains("activities") && !l.contains("extra")));
    }

    #[test]
    fn root_is_stable_and_content_sensitive() {
        let a = sample();
        assert_eq!(a.merkle_root().unwrap(), a.merkle_root().unwrap());

        let mut b = sample();
        b.credential_subject["exams"][0]["grade"] = json!(18);
        assert_ne!(a.merkle_root().unwrap(), b.merkle_root().unwrap());
        assert_ne!(a.credential_hash().unwrap(), b.credential_hash().unwrap());
    }

    #[test]
    fn credential_hash_is_canonical_digest() {
        let cred = sample();
        let expected = sha256_digest(&CanonicalBytes::new(&cred).unwrap());
        assert_eq!(cred.credential_hash().unwrap(), expected);
    }

    #[test]
    fn float_grades_cannot_be_hashed() {
        let mut cred = sample();
        cred.credential_subject["exams"][0]["grade"] = json!(27.5);
        assert!(matches!(
            cred.credential_hash(),
            Err(CanonicalizationError::FloatRejected(_))
        ));
    }

    #[test]
    fn serde_uses_w3c_member_names() {
        let v = serde_json::to_value(sample()).unwrap();
        assert!(v.get("type").is_some());
        assert!(v.get("credentialSubject").is_some());
        assert_eq!(v["issuanceDate"], "2024-07-01T09:00:00Z");
    }

    #[test]
    fn wallet_address_is_key_hash() {
        let kp = Ed25519KeyPair::from_seed(&[3u8; 32]);
        let pk = kp.public_key();
        let addr = wallet_address(&pk);
        assert_eq!(addr.as_str().len(), 64);
        assert_eq!(addr.as_str(), sha256_raw(pk.as_bytes()).to_hex());
        let other = Ed25519KeyPair::from_seed(&[4u8; 32]).public_key();
        assert_ne!(wallet_address(&other), addr);
    }
}
