//! # Verifier Facade
//!
//! Checks a verifier runs on a presented credential. None of them mutate the
//! ledger; each answers with a plain `bool`, and [`verify_presentation`]
//! collects all of them into a [`PresentationReport`].

use serde::Serialize;
use unichain_core::{CanonicalBytes, ContentDigest, CredentialId, WalletAddress};
use unichain_crypto::{Ed25519PublicKey, Ed25519Signature, MerkleAccumulator, MerkleProof};
use unichain_ledger::{CredentialStatus, Ledger};

use crate::credential::wallet_address;
use crate::presentation::PresentationProof;

/// Holder signature over the canonical encoding of `merkle_root`.
pub fn verify_subject_signature(
    merkle_root: &ContentDigest,
    signature_hex: &str,
    holder_public_key: &Ed25519PublicKey,
) -> bool {
    let Ok(signature) = Ed25519Signature::from_hex(signature_hex) else {
        return false;
    };
    let Ok(data) = CanonicalBytes::new(merkle_root) else {
        return false;
    };
    holder_public_key.verify(&data, &signature).is_ok()
}

/// `claimed_root` equals the attribute root recorded by the first issuance
/// of `credential_id`. Issuances without a root never match.
pub fn verify_root_anchored(
    ledger: &Ledger,
    credential_id: &CredentialId,
    claimed_root: &ContentDigest,
) -> bool {
    ledger
        .first_issuance(credential_id)
        .and_then(|block| block.attributes_merkle_root().copied())
        .is_some_and(|anchored| anchored == *claimed_root)
}

/// `holder_public_key` derives `claimed_wallet`, and that wallet is the
/// subject of the first issuance of `credential_id`.
pub fn verify_holder_bound(
    ledger: &Ledger,
    credential_id: &CredentialId,
    claimed_wallet: &WalletAddress,
    holder_public_key: &Ed25519PublicKey,
) -> bool {
    if wallet_address(holder_public_key) != *claimed_wallet {
        return false;
    }
    ledger
        .first_issuance(credential_id)
        .is_some_and(|block| block.transaction().subject_wallet_address() == claimed_wallet)
}

/// `true` iff the credential currently resolves to `Valid`.
pub fn verify_revocation_state(ledger: &Ledger, credential_id: &CredentialId) -> bool {
    ledger.resolve_credential_status(credential_id) == CredentialStatus::Valid
}

/// One revealed attribute against the presented root.
pub fn verify_attribute(value: &str, proof: &MerkleProof, merkle_root: &ContentDigest) -> bool {
    MerkleAccumulator::verify_proof(value, proof, merkle_root)
}

/// Outcome of every check on a presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationReport {
    pub credential_id: CredentialId,
    pub holder_signature: bool,
    /// The signing key belongs to the wallet the credential was issued to.
    pub holder_bound: bool,
    pub root_anchored: bool,
    pub not_revoked: bool,
    /// At least one attribute was revealed and every one of them verified.
    pub attributes_verified: bool,
    /// Revealed labels whose proof is missing or does not verify.
    pub failed_attributes: Vec<String>,
}

impl PresentationReport {
    pub fn is_accepted(&self) -> bool {
        self.holder_signature
            && self.holder_bound
            && self.root_anchored
            && self.not_revoked
            && self.attributes_verified
    }
}

/// Run all checks on `presentation` against `ledger`.
pub fn verify_presentation(ledger: &Ledger, presentation: &PresentationProof) -> PresentationReport {
    let id = &presentation.credential_id;
    let root = &presentation.merkle_root;

    let holder_signature =
        verify_subject_signature(root, &presentation.signature.to_hex(), &presentation.public_key);
    let holder_bound = verify_holder_bound(
        ledger,
        id,
        &presentation.wallet_address,
        &presentation.public_key,
    );
    let root_anchored = verify_root_anchored(ledger, id, root);
    let not_revoked = verify_revocation_state(ledger, id);

    let failed_attributes: Vec<String> = presentation
        .revealed_attributes
        .iter()
        .filter(|(label, value)| {
            !presentation
                .merkle_proofs
                .get(*label)
                .is_some_and(|proof| verify_attribute(value, proof, root))
        })
        .map(|(label, _)| label.clone())
        .collect();
    let attributes_verified =
        !presentation.revealed_attributes.is_empty() && failed_attributes.is_empty();

    let report = PresentationReport {
        credential_id: id.clone(),
        holder_signature,
        holder_bound,
        root_anchored,
        not_revoked,
        attributes_verified,
        failed_attributes,
    };
    if report.is_accepted() {
        tracing::info!(credential = %id, "presentation accepted");
    } else {
        tracing::warn!(
            credential = %id,
            holder_signature,
            holder_bound,
            root_anchored,
            not_revoked,
            attributes_verified,
            "presentation rejected"
        );
    }
    report
}
