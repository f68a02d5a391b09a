//! # unichain-cli: Operator Command-Line Interface
//!
//! Provides the `unichain` binary.
//!
//! ## Subcommands
//!
//! - `unichain simulate`: accredit a set of universities, issue a
//!   credential, verify a selective presentation, revoke, verify again.
//! - `unichain merkle-root`: attribute root of a credential document.
//! - `unichain prove`: inclusion proof for one attribute label.
//! - `unichain keygen`: fresh Ed25519 key and its wallet address.
//!
//! ```bash
//! unichain simulate --participants 7
//! unichain merkle-root credential.json
//! unichain prove credential.json credential.credentialSubject.name
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; ledger and credential logic stays in the
//!   domain crates.
//! - Results go to stdout as JSON; logs go to stderr.
//! - Handlers return an exit code: `0` success, `1` a check failed.

pub mod keygen;
pub mod merkle;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};
use unichain_vc::AcademicCredential;

/// Read and parse a credential document from a JSON file.
pub fn load_credential(path: &Path) -> Result<AcademicCredential> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read credential: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse credential: {}", path.display()))
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
