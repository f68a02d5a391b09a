//! # Merkle Subcommands
//!
//! `merkle-root` and `prove` over a credential document on disk. Both use
//! the same attribute flattening as presentations, so their output can be
//! checked against a root anchored on the ledger.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use unichain_core::ContentDigest;
use unichain_crypto::MerkleProof;

/// Arguments for `unichain merkle-root`.
#[derive(Args, Debug)]
pub struct MerkleRootArgs {
    /// Path to the credential JSON document.
    #[arg(value_name = "FILE")]
    pub credential: PathBuf,
}

/// Arguments for `unichain prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Path to the credential JSON document.
    #[arg(value_name = "FILE")]
    pub credential: PathBuf,
    /// Full attribute label, e.g. `credential.credentialSubject.name`.
    #[arg(value_name = "LABEL")]
    pub label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootOutput {
    pub merkle_root: ContentDigest,
    pub leaf_count: usize,
    pub depth: usize,
    /// Leaf labels in tree order; any of them can be passed to `prove`.
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofOutput {
    pub label: String,
    pub value: String,
    pub proof: MerkleProof,
    pub merkle_root: ContentDigest,
}

pub fn run_merkle_root(args: &MerkleRootArgs) -> Result<u8> {
    let output = root(&args.credential)?;
    crate::print_json(&output)?;
    Ok(0)
}

fn root(path: &std::path::Path) -> Result<RootOutput> {
    let credential = crate::load_credential(path)?;
    let tree = credential.attribute_tree()?;
    Ok(RootOutput {
        merkle_root: tree.root(),
        leaf_count: tree.leaf_count(),
        depth: tree.depth(),
        labels: tree.labels().to_vec(),
    })
}

pub fn run_prove(args: &ProveArgs) -> Result<u8> {
    let output = prove(&args.credential, &args.label)?;
    crate::print_json(&output)?;
    Ok(0)
}

fn prove(path: &std::path::Path, label: &str) -> Result<ProofOutput> {
    let credential = crate::load_credential(path)?;
    let value = credential
        .flatten_attributes()?
        .into_iter()
        .find(|a| a.label == label)
        .map(|a| a.value)
        .with_context(|| format!("no attribute labelled {label:?}"))?;
    let tree = credential.attribute_tree()?;
    Ok(ProofOutput {
        label: label.to_string(),
        value,
        proof: tree.proof(label)?,
        merkle_root: tree.root(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use unichain_crypto::MerkleAccumulator;

    fn write_credential(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("credential.json");
        let doc = json!({
            "type": ["VerifiableCredential", "AcademicCredential"],
            "issuer": "uni-graz",
            "issuanceDate": "2023-06-30T10:00:00Z",
            "credentialSubject": {"name": "Bob", "exams": [{"course": "Logic", "grade": 25}]},
        });
        std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
        path
    }

    #[test]
    fn proof_matches_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_credential(dir.path());

        let out = prove(&path, "credential.credentialSubject.exams[0].grade").unwrap();
        assert_eq!(out.value, "25");
        assert!(MerkleAccumulator::verify_proof(&out.value, &out.proof, &out.merkle_root));

        let credential = crate::load_credential(&path).unwrap();
        assert_eq!(out.merkle_root, credential.merkle_root().unwrap());
    }

    #[test]
    fn root_lists_provable_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_credential(dir.path());

        let out = root(&path).unwrap();
        assert_eq!(out.labels.len(), out.leaf_count);
        assert!(out
            .labels
            .contains(&"credential.credentialSubject.exams[0].course".to_string()));
        for label in &out.labels {
            assert_eq!(prove(&path, label).unwrap().merkle_root, out.merkle_root);
        }
    }

    #[test]
    fn unknown_label_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_credential(dir.path());
        assert!(prove(&path, "credential.credentialSubject.thesis").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = MerkleRootArgs {
            credential: dir.path().join("absent.json"),
        };
        assert!(run_merkle_root(&args).is_err());
    }
}
