//! # CLI Interface
//!
//! Command-line argument structure for `ledger-tx`, using `clap` derive.

use clap::{Args, Parser, Subcommand, ValueEnum};
use ledger_tx::transaction::{Address, CheckTransaction, U256};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Build, sign, decode and verify ledger transactions.
#[derive(Parser, Debug)]
#[command(
    name = "ledger-tx",
    about = "Build, sign, decode and verify ledger transactions",
    version,
    propagate_version = true
)]
pub struct LedgerTxCli {
    /// Log output format. Logs go to stderr.
    #[arg(long, global = true, value_enum, env = "LEDGER_TX_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a raw transaction and print it as JSON.
    Decode(DecodeArgs),
    /// Build and sign a transaction, print the raw hex and its hash.
    Sign(SignArgs),
    /// Run the admission checks on a raw transaction.
    Verify(VerifyArgs),
    /// Intrinsic gas of a payload.
    Gas(GasArgs),
    /// Generate a fresh secp256k1 key.
    Keygen(KeygenArgs),
    /// Print version information and exit.
    Version,
}

/// How much `decode` checks beyond structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckLevel {
    None,
    Cheap,
    Everything,
}

impl From<CheckLevel> for CheckTransaction {
    fn from(level: CheckLevel) -> Self {
        match level {
            CheckLevel::None => CheckTransaction::None,
            CheckLevel::Cheap => CheckTransaction::Cheap,
            CheckLevel::Everything => CheckTransaction::Everything,
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Raw transaction, hex, with or without `0x`.
    pub raw: String,

    #[arg(long, value_enum, default_value_t = CheckLevel::Everything)]
    pub check: CheckLevel,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Hex-encoded secp256k1 secret.
    ///
    /// Prefer `--key-file`; a key on the command line ends up in shell history.
    #[arg(long, env = "LEDGER_TX_KEY", conflicts_with = "key_file")]
    pub key: Option<String>,

    /// File holding the hex-encoded secret, as written by `keygen --out`.
    #[arg(long)]
    pub key_file: Option<PathBuf>,

    /// Recipient address. Omit for contract creation.
    #[arg(long, value_parser = parse_address)]
    pub to: Option<Address>,

    #[arg(long, value_parser = parse_u256, default_value = "0")]
    pub nonce: U256,

    #[arg(long, value_parser = parse_u256, default_value = "0")]
    pub gas_price: U256,

    #[arg(long, value_parser = parse_u256, default_value = "21000")]
    pub gas: U256,

    #[arg(long, value_parser = parse_u256, default_value = "0")]
    pub value: U256,

    /// Payload, hex.
    #[arg(long, default_value = "")]
    pub data: String,

    /// Bind the signature to this chain. Omit for a legacy signature.
    #[arg(long, env = "LEDGER_TX_CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Attach this 32-byte digest and produce an extension-payload transaction.
    #[arg(long)]
    pub extension_digest: Option<String>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Raw transaction, hex, with or without `0x`.
    pub raw: String,

    /// Validation policy file (JSON). Flags below override it.
    #[arg(long, short = 'c', env = "LEDGER_TX_POLICY")]
    pub config: Option<PathBuf>,

    /// Chain the transaction must be bound to.
    #[arg(long, env = "LEDGER_TX_CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Refuse signatures without replay protection.
    #[arg(long)]
    pub reject_legacy: bool,

    /// Accept high-S signatures.
    #[arg(long)]
    pub allow_high_s: bool,

    /// Accept the zero-signature placeholder.
    #[arg(long)]
    pub allow_zero_signature: bool,
}

#[derive(Args, Debug)]
pub struct GasArgs {
    /// Payload, hex.
    #[arg(default_value = "")]
    pub data: String,

    /// Price it as a contract creation.
    #[arg(long)]
    pub creation: bool,

    /// Use the frontier schedule instead of homestead.
    #[arg(long)]
    pub frontier: bool,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the secret to this file (mode 0600) instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

/// Decimal, or hex with a `0x` prefix.
pub fn parse_u256(s: &str) -> Result<U256, String> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| format!("{:?}", e)),
        None => U256::from_dec_str(s).map_err(|e| format!("{:?}", e)),
    };
    parsed.map_err(|e| format!("invalid number {:?}: {}", s, e))
}

/// 20-byte hex address, with or without `0x`.
pub fn parse_address(s: &str) -> Result<Address, String> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| format!("invalid address {:?}: {}", s, e))?;
    if bytes.len() != Address::len_bytes() {
        return Err(format!(
            "invalid address {:?}: expected 20 bytes, got {}",
            s,
            bytes.len()
        ));
    }
    Ok(Address::from_slice(&bytes))
}
