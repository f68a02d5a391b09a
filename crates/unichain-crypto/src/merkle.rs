//! # Merkle Accumulator
//!
//! Binary hash tree over an ordered list of `(label, value)` leaves, used to
//! commit to a credential's flattened attributes so a holder can later
//! disclose a subset of them.
//!
//! ## Algorithm
//!
//! - Leaf: `SHA256(utf8(value))`.
//! - Node: `SHA256(utf8(hex(left) ++ hex(right)))`. Children are joined as
//!   lowercase hex text, not raw bytes, so roots agree with existing UniChain
//!   deployments.
//! - Each level pairs adjacent nodes left to right. An odd node at the end of
//!   a level is paired with itself.
//!
//! Proof generation records, at each level, the sibling at `index ^ 1`. If
//! that sibling is past the end of the level the node's own hash is recorded
//! with side `Right`, which is exactly the duplication performed during
//! construction. Verification folds the same way, so any proof produced by
//! [`MerkleAccumulator::proof`] verifies against [`MerkleAccumulator::root`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unichain_core::ContentDigest;

use crate::sha256::sha256_raw;

/// Errors from building a tree or requesting a proof.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A tree needs at least one leaf.
    #[error("cannot build a Merkle tree with no leaves")]
    EmptyTree,

    /// No leaf carries the requested label.
    #[error("no leaf labelled {label:?}")]
    ProofNotFound { label: String },
}

/// Which side of the running hash a proof sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One level of an inclusion proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub side: Side,
    pub hash: ContentDigest,
}

/// Inclusion proof for a single labelled leaf, ordered leaf to root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub steps: Vec<ProofStep>,
}

impl MerkleProof {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Hash of a single leaf value.
pub fn leaf_hash(value: &str) -> ContentDigest {
    sha256_raw(value.as_bytes())
}

/// Hash of an interior node from its two children.
pub fn node_hash(left: &ContentDigest, right: &ContentDigest) -> ContentDigest {
    let mut joined = String::with_capacity(128);
    joined.push_str(&left.to_hex());
    joined.push_str(&right.to_hex());
    sha256_raw(joined.as_bytes())
}

/// A built Merkle tree. Value object: rebuild it when the leaves change.
#[derive(Debug, Clone)]
pub struct MerkleAccumulator {
    labels: Vec<String>,
    /// `levels[0]` holds the leaf hashes; the last level holds only the root.
    levels: Vec<Vec<ContentDigest>>,
}

impl MerkleAccumulator {
    /// Build a tree from ordered `(label, value)` leaves. Leaf order is
    /// significant: the same leaves in a different order give a different root.
    pub fn build<I, L, V>(leaves: I) -> Result<Self, MerkleError>
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: AsRef<str>,
    {
        let mut labels = Vec::new();
        let mut base = Vec::new();
        for (label, value) in leaves {
            labels.push(label.into());
            base.push(leaf_hash(value.as_ref()));
        }
        if base.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let mut levels = vec![base];
        while let Some(level) = levels.last().filter(|l| l.len() > 1) {
            let next: Vec<ContentDigest> = level
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    node_hash(left, pair.get(1).unwrap_or(left))
                })
                .collect();
            levels.push(next);
        }

        Ok(Self { labels, levels })
    }

    pub fn root(&self) -> ContentDigest {
        // `build` guarantees at least one level with at least one node.
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Inclusion proof for the first leaf carrying `label`.
    pub fn proof(&self, label: &str) -> Result<MerkleProof, MerkleError> {
        let mut index = self
            .labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| MerkleError::ProofNotFound {
                label: label.to_string(),
            })?;

        let mut steps = Vec::with_capacity(self.depth());
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = index ^ 1;
            let step = match level.get(sibling) {
                Some(hash) => ProofStep {
                    side: if sibling < index { Side::Left } else { Side::Right },
                    hash: *hash,
                },
                None => ProofStep {
                    side: Side::Right,
                    hash: level[index],
                },
            };
            steps.push(step);
            index /= 2;
        }
        Ok(MerkleProof { steps })
    }

    /// Check that `value` is included under `root` via `proof`.
    pub fn verify_proof(value: &str, proof: &MerkleProof, root: &ContentDigest) -> bool {
        let computed = proof
            .steps
            .iter()
            .fold(leaf_hash(value), |current, step| match step.side {
                Side::Left => node_hash(&step.hash, &current),
                Side::Right => node_hash(&current, &step.hash),
            });
        computed == *root
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn every_leaf_proves_against_root(
            values in prop::collection::vec(".{0,16}", 1..40),
            pick in any::<prop::sample::Index>(),
        ) {
            let leaves: Vec<(String, String)> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("credential.f{i}"), v.clone()))
                .collect();
            let tree = MerkleAccumulator::build(leaves.clone()).unwrap();
            let (label, value) = &leaves[pick.index(leaves.len())];
            let proof = tree.proof(label).unwrap();
            prop_assert!(MerkleAccumulator::verify_proof(value, &proof, &tree.root()));
        }

        #[test]
        fn changed_value_fails(
            values in prop::collection::vec("[a-z]{1,8}", 1..20),
            pick in any::<prop::sample::Index>(),
        ) {
            let leaves: Vec<(String, String)> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("k{i}"), v.clone()))
                .collect();
            let tree = MerkleAccumulator::build(leaves.clone()).unwrap();
            let (label, value) = &leaves[pick.index(leaves.len())];
            let proof = tree.proof(label).unwrap();
            let tampered = format!("{value}!");
            prop_assert!(!MerkleAccumulator::verify_proof(&tampered, &proof, &tree.root()));
        }
    }
}
