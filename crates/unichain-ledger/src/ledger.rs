//! # Ledger
//!
//! Ordered, append-only sequence of blocks starting at a fixed genesis
//! block, plus the admission protocol that gates every append.
//!
//! ## Concurrency
//!
//! Two locks with distinct jobs:
//!
//! - `chain` is a `parking_lot::RwLock` taken only for short, synchronous
//!   sections. Readers (status lookups, integrity scans, replica head checks)
//!   never wait on an admission round in flight.
//! - `writer` is an async mutex held for the whole of `append` and
//!   `revoke_credential`, so at most one candidate is outstanding and two
//!   candidates can never reference the same `previousHash`.
//!
//! The chain is pushed to exactly once per successful round, after every
//! replica has answered. Dropping an `append` future earlier leaves the
//! chain untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use unichain_core::{ContentDigest, CredentialId, ParticipantId, WalletAddress};

use crate::block::{Block, UnsignedBlock};
use crate::config::LedgerConfig;
use crate::error::{AppendError, RevokeError};
use crate::integrity::{verify_chain, IntegrityViolation};
use crate::pki::{PkiRegistry, Proposer};
use crate::quorum::{AdmissionQuorum, QuorumOutcome};
use crate::replica::{head_link, ChainView, Replica, ReplicaResponse};
use crate::transaction::{Transaction, TransactionError, TransactionKind};

/// Position of a block in the chain; genesis is 0.
pub type BlockIndex = usize;

/// Current standing of a credential, derived from the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    Valid,
    Revoked,
    Unknown,
}

pub struct Ledger {
    config: LedgerConfig,
    chain: Arc<RwLock<Vec<Block>>>,
    writer: tokio::sync::Mutex<()>,
    pki: Arc<dyn PkiRegistry>,
    replicas: RwLock<BTreeMap<ParticipantId, Arc<dyn Replica>>>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .field("blocks", &self.len())
            .field("replicas", &self.replicas.read().len())
            .finish()
    }
}

impl Ledger {
    /// A ledger holding only the genesis block.
    pub fn new(config: LedgerConfig, pki: Arc<dyn PkiRegistry>) -> Result<Self, TransactionError> {
        let genesis = Block::genesis(&config.format_version)?;
        Ok(Self::with_blocks(config, pki, vec![genesis]))
    }

    /// Rebuild a ledger from an exported block sequence.
    ///
    /// Only the genesis block is checked here. Call [`Ledger::is_valid`]
    /// before trusting the rest.
    pub fn from_blocks(
        config: LedgerConfig,
        pki: Arc<dyn PkiRegistry>,
        blocks: Vec<Block>,
    ) -> Result<Self, IntegrityViolation> {
        match blocks.first() {
            Some(genesis) if genesis.is_genesis() => Ok(Self::with_blocks(config, pki, blocks)),
            _ => Err(IntegrityViolation::MissingGenesis),
        }
    }

    fn with_blocks(config: LedgerConfig, pki: Arc<dyn PkiRegistry>, blocks: Vec<Block>) -> Self {
        Self {
            config,
            chain: Arc::new(RwLock::new(blocks)),
            writer: tokio::sync::Mutex::new(()),
            pki,
            replicas: RwLock::new(BTreeMap::new()),
        }
    }

    /// Make `replica` reachable for admission rounds. Replaces any replica
    /// already registered under the same id.
    pub fn register_replica(&self, replica: Arc<dyn Replica>) {
        let id = replica.id().clone();
        tracing::debug!(replica = %id, "replica registered");
        self.replicas.write().insert(id, replica);
    }

    /// Read-only handle for replicas that validate against this chain.
    pub fn view(&self) -> ChainView {
        ChainView::new(Arc::clone(&self.chain))
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.chain.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.read().is_empty()
    }

    pub fn head_hash(&self) -> Option<ContentDigest> {
        self.chain.read().last().and_then(|b| b.hash().ok())
    }

    /// Consistent copy of the whole chain.
    pub fn snapshot(&self) -> Vec<Block> {
        self.chain.read().clone()
    }

    pub fn block(&self, index: BlockIndex) -> Option<Block> {
        self.chain.read().get(index).cloned()
    }

    /// Propose `transaction` in a new block signed by `proposer` and commit
    /// it if the admission quorum accepts.
    pub async fn append<P: Proposer + ?Sized>(
        &self,
        transaction: Transaction,
        proposer: &P,
        attributes_merkle_root: Option<ContentDigest>,
    ) -> Result<BlockIndex, AppendError> {
        let _writer = self.writer.lock().await;
        self.append_locked(transaction, proposer, attributes_merkle_root)
            .await
    }

    async fn append_locked<P: Proposer + ?Sized>(
        &self,
        transaction: Transaction,
        proposer: &P,
        attributes_merkle_root: Option<ContentDigest>,
    ) -> Result<BlockIndex, AppendError> {
        let proposer_id = proposer.public_identity().clone();
        if !self.pki.is_accredited(&proposer_id) {
            tracing::warn!(proposer = %proposer_id, "rejected block from unaccredited proposer");
            return Err(AppendError::UnaccreditedProposer {
                proposer: proposer_id,
            });
        }

        let previous_hash = head_link(&self.chain.read())?;
        let candidate = UnsignedBlock::build(
            previous_hash,
            transaction,
            proposer_id.clone(),
            attributes_merkle_root,
            self.config.format_version.as_str(),
        )
        .sign(proposer)?;
        let signature_valid = self
            .pki
            .public_key(&proposer_id)
            .is_some_and(|key| candidate.verify_signature(&key));
        if !signature_valid {
            tracing::warn!(proposer = %proposer_id, "proposer signature does not match registered key");
            return Err(AppendError::InvalidSignature {
                proposer: proposer_id,
            });
        }

        let participants = self.pki.active_participants();
        let quorum = AdmissionQuorum::for_round(&participants, &proposer_id);
        let replica_ids: Vec<ParticipantId> = participants
            .into_iter()
            .filter(|p| *p != proposer_id)
            .collect();
        let responses = self.solicit(&candidate, replica_ids).await;
        let outcome = quorum.decide(&responses);

        if !outcome.is_committed() {
            log_consensus_failure(&proposer_id, &outcome);
            return Err(AppendError::ConsensusFailure {
                accepted: outcome.accepted,
                required: outcome.required,
            });
        }

        let kind = candidate.transaction_type();
        let credential = candidate.transaction().credential_id().clone();
        let index = self.commit(candidate)?;
        tracing::info!(
            index,
            proposer = %proposer_id,
            %kind,
            credential = %credential,
            accepted = outcome.accepted,
            required = outcome.required,
            "block committed"
        );
        Ok(index)
    }

    /// Ask every replica to validate `candidate`, concurrently, each call
    /// bounded by the configured timeout.
    async fn solicit(&self, candidate: &Block, ids: Vec<ParticipantId>) -> Vec<ReplicaResponse> {
        let targets: Vec<(ParticipantId, Option<Arc<dyn Replica>>)> = {
            let registered = self.replicas.read();
            ids.into_iter()
                .map(|id| {
                    let replica = registered.get(&id).cloned();
                    (id, replica)
                })
                .collect()
        };
        let timeout = self.config.replica_timeout();

        let votes = targets.iter().map(|(id, replica)| async move {
            let response = match replica {
                None => {
                    tracing::warn!(replica = %id, "accredited participant has no registered replica");
                    ReplicaResponse::Reject
                }
                Some(replica) => {
                    match tokio::time::timeout(timeout, replica.validate(candidate)).await {
                        Ok(response) => response,
                        Err(_) => {
                            tracing::warn!(
                                replica = %id,
                                timeout_ms = timeout.as_millis() as u64,
                                "replica timed out"
                            );
                            ReplicaResponse::Timeout
                        }
                    }
                }
            };
            tracing::debug!(replica = %id, ?response, "replica vote");
            response
        });
        join_all(votes).await
    }

    fn commit(&self, candidate: Block) -> Result<BlockIndex, AppendError> {
        let mut chain = self.chain.write();
        let head = head_link(&chain)?;
        if candidate.previous_hash() != head {
            tracing::warn!(expected = %candidate.previous_hash(), found = %head, "head moved during admission");
            return Err(AppendError::ChainLinkage {
                expected: candidate.previous_hash().to_string(),
                found: head,
            });
        }
        chain.push(candidate);
        Ok(chain.len() - 1)
    }

    /// Full integrity scan; `false` on the first violation.
    pub fn is_valid(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(violation) => {
                tracing::warn!(%violation, "chain integrity violation");
                false
            }
        }
    }

    /// Full integrity scan naming the first violation.
    pub fn verify(&self) -> Result<(), IntegrityViolation> {
        verify_chain(&self.chain.read(), self.pki.as_ref())
    }

    /// Anchor a revocation for a credential whose latest record is an
    /// issuance. The lookup and the append run under the same writer lock.
    pub async fn revoke_credential<P: Proposer + ?Sized>(
        &self,
        credential_id: &CredentialId,
        credential_hash: &str,
        subject_wallet_address: &WalletAddress,
        proposer: &P,
        attributes_merkle_root: Option<ContentDigest>,
    ) -> Result<BlockIndex, RevokeError> {
        let _writer = self.writer.lock().await;

        match self.latest_transaction(credential_id).map(|tx| tx.kind()) {
            None => {
                return Err(RevokeError::CredentialNotFound {
                    credential_id: credential_id.clone(),
                })
            }
            Some(TransactionKind::Revocation) => {
                return Err(RevokeError::AlreadyRevoked {
                    credential_id: credential_id.clone(),
                })
            }
            Some(TransactionKind::Issuance) => {}
        }

        let revocation = Transaction::create(
            TransactionKind::Revocation,
            credential_hash,
            credential_id,
            subject_wallet_address,
        )?
        .sign(proposer)?;
        let index = self
            .append_locked(revocation, proposer, attributes_merkle_root)
            .await?;
        tracing::info!(credential = %credential_id, index, "credential revoked");
        Ok(index)
    }

    /// Scan from the head backward; the first decisive record wins.
    pub fn resolve_credential_status(&self, credential_id: &CredentialId) -> CredentialStatus {
        let chain = self.chain.read();
        for block in chain.iter().skip(1).rev() {
            let tx = block.transaction();
            if tx.credential_id() != credential_id {
                continue;
            }
            match tx.kind() {
                TransactionKind::Issuance => return CredentialStatus::Valid,
                TransactionKind::Revocation if tx.revoked() => return CredentialStatus::Revoked,
                TransactionKind::Revocation => {}
            }
        }
        CredentialStatus::Unknown
    }

    /// Most recent non-genesis transaction for `credential_id`.
    pub fn latest_transaction(&self, credential_id: &CredentialId) -> Option<Transaction> {
        self.chain
            .read()
            .iter()
            .skip(1)
            .rev()
            .map(Block::transaction)
            .find(|tx| tx.credential_id() == credential_id)
            .cloned()
    }

    /// Oldest issuance block for `credential_id`.
    pub fn first_issuance(&self, credential_id: &CredentialId) -> Option<Block> {
        self.chain
            .read()
            .iter()
            .skip(1)
            .find(|b| {
                b.transaction_type() == TransactionKind::Issuance
                    && b.transaction().credential_id() == credential_id
            })
            .cloned()
    }
}

fn log_consensus_failure(proposer: &ParticipantId, outcome: &QuorumOutcome) {
    tracing::warn!(
        proposer = %proposer,
        accepted = outcome.accepted,
        rejected = outcome.rejected,
        timed_out = outcome.timed_out,
        required = outcome.required,
        "consensus failure, candidate discarded"
    );
}
