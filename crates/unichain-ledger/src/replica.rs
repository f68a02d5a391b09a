//! # Replicas
//!
//! A replica is an accredited participant, other than the proposer, whose
//! acceptance of a candidate block counts toward the admission quorum.
//! Replicas are reached through the async [`Replica`] trait; the ledger
//! bounds every call with a timeout and treats a timeout as a rejection.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use unichain_core::{CanonicalizationError, ParticipantId};

use crate::block::{Block, GENESIS_PREVIOUS_HASH};
use crate::pki::PkiRegistry;

/// A replica's answer to a candidate block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaResponse {
    Accept,
    Reject,
    Timeout,
}

/// A participant that votes on candidate blocks.
#[async_trait]
pub trait Replica: Send + Sync {
    fn id(&self) -> &ParticipantId;

    async fn validate(&self, candidate: &Block) -> ReplicaResponse;
}

/// Read-only handle on a ledger's committed chain.
///
/// Cloning is cheap; all clones observe the same chain.
#[derive(Debug, Clone)]
pub struct ChainView {
    chain: Arc<RwLock<Vec<Block>>>,
}

impl ChainView {
    pub(crate) fn new(chain: Arc<RwLock<Vec<Block>>>) -> Self {
        Self { chain }
    }

    pub fn len(&self) -> usize {
        self.chain.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.read().is_empty()
    }

    /// Hex hash of the newest block, which the next block must reference.
    pub fn head_link(&self) -> Result<String, CanonicalizationError> {
        head_link(&self.chain.read())
    }
}

/// The `previousHash` a block appended after `chain` must carry.
pub(crate) fn head_link(chain: &[Block]) -> Result<String, CanonicalizationError> {
    match chain.last() {
        Some(head) => Ok(head.hash()?.to_hex()),
        None => Ok(GENESIS_PREVIOUS_HASH.to_string()),
    }
}

/// Replica running in-process against a shared chain view.
///
/// Accepts a candidate only if it extends the current head and its proposer
/// signature verifies under the key the PKI holds for the proposer.
pub struct LocalReplica {
    id: ParticipantId,
    view: ChainView,
    pki: Arc<dyn PkiRegistry>,
}

impl LocalReplica {
    pub fn new(id: ParticipantId, view: ChainView, pki: Arc<dyn PkiRegistry>) -> Self {
        Self { id, view, pki }
    }
}

#[async_trait]
impl Replica for LocalReplica {
    fn id(&self) -> &ParticipantId {
        &self.id
    }

    async fn validate(&self, candidate: &Block) -> ReplicaResponse {
        let head = match self.view.head_link() {
            Ok(head) => head,
            Err(e) => {
                tracing::warn!(replica = %self.id, error = %e, "cannot hash local head");
                return ReplicaResponse::Reject;
            }
        };
        if candidate.previous_hash() != head {
            tracing::debug!(replica = %self.id, "candidate does not extend local head");
            return ReplicaResponse::Reject;
        }
        let Some(key) = self.pki.public_key(candidate.proposer_id()) else {
            tracing::debug!(replica = %self.id, proposer = %candidate.proposer_id(), "unknown proposer key");
            return ReplicaResponse::Reject;
        };
        if !candidate.verify_signature(&key) {
            tracing::debug!(replica = %self.id, "proposer signature does not verify");
            return ReplicaResponse::Reject;
        }
        ReplicaResponse::Accept
    }
}

/// Replica that accepts every candidate without looking at it.
///
/// Offers no safety whatsoever; for tests and demos only.
pub struct AutoAcceptReplica {
    id: ParticipantId,
}

impl AutoAcceptReplica {
    pub fn new(id: ParticipantId) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Replica for AutoAcceptReplica {
    fn id(&self) -> &ParticipantId {
        &self.id
    }

    async fn validate(&self, _candidate: &Block) -> ReplicaResponse {
        ReplicaResponse::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::UnsignedBlock;
    use crate::pki::{AccreditationRegistry, Participant};
    use crate::transaction::{Transaction, TransactionKind};
    use unichain_crypto::Signer;

    fn setup() -> (LocalReplica, ChainView, Participant, Participant) {
        let registry = Arc::new(AccreditationRegistry::new());
        let a = Participant::generate(ParticipantId::new("uni-a").unwrap());
        let b = Participant::generate(ParticipantId::new("uni-b").unwrap());
        for p in [&a, &b] {
            registry.accredit(p.id().clone(), "U", p.public_key());
        }
        let genesis = Block::genesis("1.0").unwrap();
        let view = ChainView::new(Arc::new(RwLock::new(vec![genesis])));
        let replica = LocalReplica::new(b.id().clone(), view.clone(), registry);
        (replica, view, a, b)
    }

    fn candidate(view: &ChainView, claimed: &Participant, signer: &Participant) -> Block {
        let tx = Transaction::create(TransactionKind::Issuance, "h", "CAD-1", "wallet-1")
            .unwrap()
            .sign(claimed)
            .unwrap();
        UnsignedBlock::build(view.head_link().unwrap(), tx, claimed.id().clone(), None, "1.0")
            .sign(signer)
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_well_formed_candidate() {
        let (replica, view, a, _) = setup();
        let block = candidate(&view, &a, &a);
        assert_eq!(replica.validate(&block).await, ReplicaResponse::Accept);
    }

    #[tokio::test]
    async fn rejects_signature_from_another_key() {
        let (replica, view, a, b) = setup();
        let block = candidate(&view, &a, &b);
        assert_eq!(replica.validate(&block).await, ReplicaResponse::Reject);
    }

    #[tokio::test]
    async fn rejects_stale_previous_hash() {
        let (replica, _, a, _) = setup();
        let tx = Transaction::create(TransactionKind::Issuance, "h", "CAD-1", "wallet-1")
            .unwrap()
            .sign(&a)
            .unwrap();
        let block = UnsignedBlock::build("00", tx, a.id().clone(), None, "1.0")
            .sign(&a)
            .unwrap();
        assert_eq!(replica.validate(&block).await, ReplicaResponse::Reject);
    }
}
