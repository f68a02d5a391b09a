//! # unichain CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use unichain_cli::keygen::{run_keygen, KeygenArgs};
use unichain_cli::merkle::{run_merkle_root, run_prove, MerkleRootArgs, ProveArgs};
use unichain_cli::simulate::{run_simulate, SimulateArgs};

/// UniChain: credential ledger toolchain.
///
/// Simulates a university consortium anchoring academic credentials, and
/// computes attribute roots and proofs for selective disclosure.
#[derive(Parser, Debug)]
#[command(name = "unichain", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv). Overrides
    /// RUST_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an issue / present / revoke round on an in-process consortium.
    Simulate(SimulateArgs),

    /// Print the attribute Merkle root of a credential document.
    MerkleRoot(MerkleRootArgs),

    /// Print the inclusion proof for one attribute label.
    Prove(ProveArgs),

    /// Generate an Ed25519 key and print its wallet address.
    Keygen(KeygenArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Simulate(args) => run_simulate(&args),
        Commands::MerkleRoot(args) => run_merkle_root(&args),
        Commands::Prove(args) => run_prove(&args),
        Commands::Keygen(args) => run_keygen(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
