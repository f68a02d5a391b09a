//! # Simulate Subcommand
//!
//! End-to-end run on an in-process consortium: every participant is
//! accredited and runs a `LocalReplica`; the first one issues a transcript
//! to a fresh student wallet. The student presents name and grades, the
//! issuer revokes, and the same presentation is verified again.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::json;
use unichain_core::{ContentDigest, CredentialId, ParticipantId};
use unichain_crypto::{Ed25519KeyPair, Signer};
use unichain_ledger::{
    AccreditationRegistry, AdmissionQuorum, BlockIndex, CredentialStatus, Ledger, LedgerConfig,
    LocalReplica, Participant, PkiRegistry, Transaction, TransactionKind,
};
use unichain_vc::{
    verify_presentation, wallet_address, AcademicCredential, PresentationProof,
    PresentationReport,
};

const REVEALED_FIELDS: &[&str] = &["name", "grade"];

/// Arguments for `unichain simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of accredited universities, proposer included.
    #[arg(long, default_value_t = 4)]
    pub participants: usize,

    /// YAML ledger configuration. `UNICHAIN_*` variables still override it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub participants: usize,
    pub quorum_required: usize,
    pub credential_id: CredentialId,
    pub credential_hash: ContentDigest,
    pub merkle_root: ContentDigest,
    pub issuance_index: BlockIndex,
    pub revocation_index: BlockIndex,
    pub before_revocation: PresentationReport,
    pub after_revocation: PresentationReport,
    pub final_status: CredentialStatus,
    pub chain_length: usize,
    pub head_hash: Option<ContentDigest>,
    pub chain_valid: bool,
}

impl SimulationReport {
    /// Accepted before revocation, rejected after, chain intact.
    pub fn succeeded(&self) -> bool {
        self.before_revocation.is_accepted()
            && !self.after_revocation.is_accepted()
            && self.final_status == CredentialStatus::Revoked
            && self.chain_valid
    }
}

pub fn run_simulate(args: &SimulateArgs) -> Result<u8> {
    let config = match &args.config {
        Some(path) => LedgerConfig::from_yaml_file(path)?.with_env_overrides()?,
        None => LedgerConfig::from_env()?,
    };
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let report = runtime.block_on(simulate(args.participants, config))?;
    crate::print_json(&report)?;
    Ok(if report.succeeded() { 0 } else { 1 })
}

pub async fn simulate(participants: usize, config: LedgerConfig) -> Result<SimulationReport> {
    if participants < 2 {
        bail!("a consortium needs at least 2 participants, got {participants}");
    }

    let registry = Arc::new(AccreditationRegistry::new());
    let unis = (1..=participants)
        .map(|i| -> Result<Participant> {
            Ok(Participant::generate(ParticipantId::new(format!("uni-{i:02}"))?))
        })
        .collect::<Result<Vec<_>>>()?;
    for uni in &unis {
        registry.accredit(uni.id().clone(), format!("University {}", uni.id()), uni.public_key());
    }

    let ledger = Ledger::new(config, registry.clone())?;
    for uni in &unis {
        ledger.register_replica(Arc::new(LocalReplica::new(
            uni.id().clone(),
            ledger.view(),
            registry.clone(),
        )));
    }

    let issuer = &unis[0];
    let quorum = AdmissionQuorum::for_round(&registry.active_participants(), issuer.id());
    tracing::info!(
        participants,
        replicas = quorum.replicas(),
        required = quorum.required(),
        "consortium ready"
    );

    let student = Ed25519KeyPair::generate();
    let wallet = wallet_address(&student.public_key());
    let credential = transcript(issuer.id());
    let credential_id = CredentialId::new("CAD-SIM-0001")?;
    let credential_hash = credential.credential_hash()?;
    let merkle_root = credential.merkle_root()?;

    let issuance = Transaction::create(
        TransactionKind::Issuance,
        credential_hash.to_hex(),
        &credential_id,
        &wallet,
    )?
    .sign(issuer)?;
    let issuance_index = ledger.append(issuance, issuer, Some(merkle_root)).await?;

    let presentation = PresentationProof::build(
        credential_id.clone(),
        &credential,
        &student,
        wallet.clone(),
        REVEALED_FIELDS,
    )?;
    let before_revocation = verify_presentation(&ledger, &presentation);

    let revocation_index = ledger
        .revoke_credential(&credential_id, &credential_hash.to_hex(), &wallet, issuer, None)
        .await?;
    let after_revocation = verify_presentation(&ledger, &presentation);

    Ok(SimulationReport {
        participants,
        quorum_required: quorum.required(),
        final_status: ledger.resolve_credential_status(&credential_id),
        credential_id,
        credential_hash,
        merkle_root,
        issuance_index,
        revocation_index,
        before_revocation,
        after_revocation,
        chain_length: ledger.len(),
        head_hash: ledger.head_hash(),
        chain_valid: ledger.is_valid(),
    })
}

fn transcript(issuer: &ParticipantId) -> AcademicCredential {
    AcademicCredential::new(
        issuer.as_str(),
        json!({
            "name": "Alice Rossi",
            "degree": {"title": "MSc Computer Science", "ects": 120},
            "enrollment": {"year": 2022, "status": "completed"},
            "exams": [
                {"course": "Distributed Systems", "grade": 30, "ects": 9},
                {"course": "Applied Cryptography", "grade": 28, "ects": 6},
                {"course": "Machine Learning", "grade": 27, "ects": 6},
            ],
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn four_universities_round_trip() {
        let report = simulate(4, LedgerConfig::default()).await.unwrap();
        assert!(report.succeeded(), "{report:?}");
        assert_eq!(report.quorum_required, 3);
        assert_eq!((report.issuance_index, report.revocation_index), (1, 2));
        assert_eq!(report.chain_length, 3);
        assert!(report.before_revocation.failed_attributes.is_empty());
        assert!(report.after_revocation.root_anchored);
        assert!(!report.after_revocation.not_revoked);
    }

    #[tokio::test]
    async fn larger_consortium_raises_quorum() {
        let report = simulate(7, LedgerConfig::default()).await.unwrap();
        assert_eq!(report.quorum_required, 5);
        assert!(report.succeeded());
    }

    #[tokio::test]
    async fn lone_university_rejected() {
        assert!(simulate(1, LedgerConfig::default()).await.is_err());
    }

    #[test]
    fn config_file_is_honoured() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format_version: \"1.1\"\nreplica_timeout_ms: 500").unwrap();
        let args = SimulateArgs {
            participants: 3,
            config: Some(file.path().to_path_buf()),
        };
        assert_eq!(run_simulate(&args).unwrap(), 0);
    }

    #[test]
    fn bad_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "replica_timeout_ms: 0").unwrap();
        let args = SimulateArgs {
            participants: 3,
            config: Some(file.path().to_path_buf()),
        };
        assert!(run_simulate(&args).is_err());
    }
}
