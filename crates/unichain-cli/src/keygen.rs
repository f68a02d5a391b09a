//! # Keygen Subcommand

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use unichain_crypto::Ed25519KeyPair;
use unichain_vc::wallet_address;

/// Arguments for `unichain keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Derive the key from a 32-byte hex seed instead of the OS RNG.
    #[arg(long, value_name = "HEX")]
    pub seed: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeygenOutput {
    pub public_key: String,
    pub wallet_address: String,
}

pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let output = keygen(args.seed.as_deref())?;
    crate::print_json(&output)?;
    Ok(0)
}

fn keygen(seed_hex: Option<&str>) -> Result<KeygenOutput> {
    let keys = match seed_hex {
        Some(hex) => Ed25519KeyPair::from_seed(&parse_seed(hex)?),
        None => Ed25519KeyPair::generate(),
    };
    let public_key = keys.public_key();
    Ok(KeygenOutput {
        public_key: public_key.to_hex(),
        wallet_address: wallet_address(&public_key).to_string(),
    })
}

fn parse_seed(hex: &str) -> Result<[u8; 32]> {
    let hex = hex.trim();
    if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        anyhow::bail!("seed must be 64 hex characters");
    }
    let mut seed = [0u8; 32];
    for (i, byte) in seed.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)?;
    }
    Ok(seed)
}
