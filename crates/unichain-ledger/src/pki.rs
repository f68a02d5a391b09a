//! # Accreditation and Participant Identity
//!
//! The ledger consults an accreditation authority through the narrow
//! [`PkiRegistry`] trait: is a participant currently accredited, who is
//! active right now, and which public key belongs to a participant id.
//!
//! [`AccreditationRegistry`] is the in-memory authority used by the CLI and
//! tests. Revoking a participant removes it from the active set but keeps
//! its key entry, so blocks it proposed earlier remain verifiable.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;
use serde::Serialize;
use unichain_core::{CanonicalBytes, ParticipantId, Timestamp};
use unichain_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, Signer};

/// Read-only view of the accreditation authority.
pub trait PkiRegistry: Send + Sync {
    /// Whether `id` holds an active (unrevoked) accreditation.
    fn is_accredited(&self, id: &ParticipantId) -> bool;

    /// Every currently accredited participant.
    fn active_participants(&self) -> BTreeSet<ParticipantId>;

    /// Public key registered for `id`, including revoked participants.
    fn public_key(&self, id: &ParticipantId) -> Option<Ed25519PublicKey>;
}

/// A participant able to propose blocks.
pub trait Proposer: Signer + Send + Sync {
    fn public_identity(&self) -> &ParticipantId;
}

/// An accredited institution: an id plus its Ed25519 key pair.
#[derive(Debug)]
pub struct Participant {
    id: ParticipantId,
    keys: Ed25519KeyPair,
}

impl Participant {
    pub fn new(id: ParticipantId, keys: Ed25519KeyPair) -> Self {
        Self { id, keys }
    }

    /// A participant with a freshly generated key pair.
    pub fn generate(id: ParticipantId) -> Self {
        Self::new(id, Ed25519KeyPair::generate())
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }
}

impl Signer for Participant {
    fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        self.keys.sign(data)
    }

    fn public_key(&self) -> Ed25519PublicKey {
        self.keys.public_key()
    }
}

impl Proposer for Participant {
    fn public_identity(&self) -> &ParticipantId {
        &self.id
    }
}

/// A registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accreditation {
    pub participant_id: ParticipantId,
    pub official_name: String,
    pub public_key: Ed25519PublicKey,
    pub accredited_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

impl Accreditation {
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

/// In-memory accreditation authority.
#[derive(Debug, Default)]
pub struct AccreditationRegistry {
    entries: RwLock<BTreeMap<ParticipantId, Accreditation>>,
}

impl AccreditationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accredit a participant, replacing any earlier entry for the same id.
    pub fn accredit(
        &self,
        id: ParticipantId,
        official_name: impl Into<String>,
        public_key: Ed25519PublicKey,
    ) -> Accreditation {
        let entry = Accreditation {
            participant_id: id.clone(),
            official_name: official_name.into(),
            public_key,
            accredited_at: Timestamp::now(),
            revoked_at: None,
        };
        tracing::info!(participant = %id, "participant accredited");
        self.entries.write().insert(id, entry.clone());
        entry
    }

    /// Revoke an active accreditation. Returns `false` if `id` has no
    /// active entry.
    pub fn revoke(&self, id: &ParticipantId) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(id) {
            Some(entry) if entry.is_active() => {
                entry.revoked_at = Some(Timestamp::now());
                tracing::info!(participant = %id, "accreditation revoked");
                true
            }
            _ => {
                tracing::warn!(participant = %id, "no active accreditation to revoke");
                false
            }
        }
    }

    pub fn accreditation(&self, id: &ParticipantId) -> Option<Accreditation> {
        self.entries.read().get(id).cloned()
    }
}

impl PkiRegistry for AccreditationRegistry {
    fn is_accredited(&self, id: &ParticipantId) -> bool {
        self.entries
            .read()
            .get(id)
            .is_some_and(Accreditation::is_active)
    }

    fn active_participants(&self) -> BTreeSet<ParticipantId> {
        self.entries
            .read()
            .values()
            .filter(|e| e.is_active())
            .map(|e| e.participant_id.clone())
            .collect()
    }

    fn public_key(&self, id: &ParticipantId) -> Option<Ed25519PublicKey> {
        self.entries.read().get(id).map(|e| e.public_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ParticipantId {
        ParticipantId::new(s).unwrap()
    }

    #[test]
    fn accredit_then_revoke() {
        let registry = AccreditationRegistry::new();
        let uni = Participant::generate(pid("uni-salerno"));
        registry.accredit(uni.id().clone(), "Universita di Salerno", uni.public_key());

        assert!(registry.is_accredited(uni.id()));
        assert_eq!(registry.active_participants().len(), 1);

        assert!(registry.revoke(uni.id()));
        assert!(!registry.is_accredited(uni.id()));
        assert!(registry.active_participants().is_empty());
        // Key stays for historic verification.
        assert_eq!(registry.public_key(uni.id()), Some(uni.public_key()));
        assert!(registry.accreditation(uni.id()).unwrap().revoked_at.is_some());
    }

    #[test]
    fn revoke_unknown_or_twice() {
        let registry = AccreditationRegistry::new();
        assert!(!registry.revoke(&pid("nobody")));

        let kp = Ed25519KeyPair::generate();
        registry.accredit(pid("uni-a"), "A", kp.public_key());
        assert!(registry.revoke(&pid("uni-a")));
        assert!(!registry.revoke(&pid("uni-a")));
    }

    #[test]
    fn unknown_participant_has_no_key() {
        let registry = AccreditationRegistry::new();
        assert!(!registry.is_accredited(&pid("ghost")));
        assert!(registry.public_key(&pid("ghost")).is_none());
    }

    #[test]
    fn participant_signs_with_its_key() {
        let uni = Participant::generate(pid("uni-b"));
        let msg = CanonicalBytes::new(&"payload").unwrap();
        let sig = uni.sign(&msg);
        assert!(uni.public_key().verify(&msg, &sig).is_ok());
        assert_eq!(uni.public_identity(), uni.id());
    }
}
