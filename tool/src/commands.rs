//! Subcommand implementations.
//!
//! Each command returns its result as a value; `main` decides how to print
//! it. Failures bubble up as `anyhow::Error` with context attached.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use ledger_tx::config::{GasSchedule, ValidationPolicy};
use ledger_tx::crypto::KeyPair;
use ledger_tx::exception::{classify, TransactionException};
use ledger_tx::transaction::{
    base_gas_required, verify_transaction, Address, Transaction, TransactionBuilder,
    TransactionSummary, H256,
};

use crate::cli::{DecodeArgs, GasArgs, KeygenArgs, SignArgs, VerifyArgs};

/// Hex to bytes, tolerating a `0x` prefix and surrounding whitespace.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .with_context(|| format!("invalid hex input: {:?}", trimmed))
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

pub fn decode(args: &DecodeArgs) -> Result<TransactionSummary> {
    let raw = decode_hex(&args.raw)?;
    let tx = Transaction::decode(&raw, args.check.into()).context("failed to decode transaction")?;
    tracing::info!(kind = %tx.kind(), chain_id = tx.chain_id(), "transaction decoded");
    Ok(TransactionSummary::from(&tx))
}

// ---------------------------------------------------------------------------
// sign
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SignOutput {
    pub raw: String,
    pub hash: H256,
    pub sender: Address,
}

pub fn sign(args: &SignArgs) -> Result<SignOutput> {
    let key = load_key(args)?;

    let mut builder = TransactionBuilder::new()
        .nonce(args.nonce)
        .gas_price(args.gas_price)
        .gas(args.gas)
        .value(args.value)
        .data(decode_hex(&args.data).context("invalid --data")?);
    if let Some(to) = args.to {
        builder = builder.to(to);
    }
    if let Some(chain_id) = args.chain_id {
        builder = builder.chain_id(chain_id);
    }
    if let Some(digest) = &args.extension_digest {
        let bytes = decode_hex(digest).context("invalid --extension-digest")?;
        if bytes.len() != 32 {
            bail!("--extension-digest must be 32 bytes, got {}", bytes.len());
        }
        builder = builder.extension_digest(H256::from_slice(&bytes));
    }

    let tx = builder.sign(&key).context("failed to sign transaction")?;
    let raw = tx.encode().context("failed to encode signed transaction")?;
    let hash = tx.hash().context("failed to hash signed transaction")?;

    tracing::info!(hash = ?hash, sender = ?key.address(), "transaction signed");
    Ok(SignOutput {
        raw: format!("0x{}", hex::encode(raw)),
        hash,
        sender: key.address(),
    })
}

fn load_key(args: &SignArgs) -> Result<KeyPair> {
    let secret = match (&args.key, &args.key_file) {
        (Some(hex), _) => hex.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display()))?,
        (None, None) => bail!("a signing key is required: pass --key or --key-file"),
    };
    KeyPair::from_hex(&secret).context("invalid signing key")
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub status: TransactionException,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<H256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyReport {
    pub fn accepted(&self) -> bool {
        !self.status.is_failure()
    }

    fn rejected(err: &ledger_tx::TransactionError) -> Self {
        Self {
            status: classify(err),
            sender: None,
            hash: None,
            error: Some(err.to_string()),
        }
    }
}

pub fn verify(args: &VerifyArgs) -> Result<VerifyReport> {
    let policy = policy_for(args)?;
    let raw = decode_hex(&args.raw)?;

    let tx = match Transaction::decode(&raw, ledger_tx::CheckTransaction::None) {
        Ok(tx) => tx,
        Err(err) => return Ok(VerifyReport::rejected(&err)),
    };

    let report = match verify_transaction(&tx, &policy) {
        Ok(sender) => VerifyReport {
            status: TransactionException::None,
            sender: Some(sender),
            hash: tx.hash().ok(),
            error: None,
        },
        Err(err) => VerifyReport::rejected(&err),
    };
    tracing::info!(status = %report.status, chain_id = policy.chain_id, "verification finished");
    Ok(report)
}

/// Policy file (if any) with command-line overrides applied on top.
pub fn policy_for(args: &VerifyArgs) -> Result<ValidationPolicy> {
    let mut policy = match &args.config {
        Some(path) => load_policy(path)?,
        None => ValidationPolicy::default(),
    };
    if let Some(chain_id) = args.chain_id {
        policy.chain_id = i64::try_from(chain_id).context("--chain-id out of range")?;
    }
    if args.reject_legacy {
        policy.allow_legacy_signatures = false;
    }
    if args.allow_high_s {
        policy.require_low_s = false;
    }
    if args.allow_zero_signature {
        policy.allow_zero_signature = true;
    }
    Ok(policy)
}

pub fn load_policy(path: &Path) -> Result<ValidationPolicy> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file {}", path.display()))?;
    let policy = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse policy file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "policy loaded");
    Ok(policy)
}

// ---------------------------------------------------------------------------
// gas
// ---------------------------------------------------------------------------

pub fn gas(args: &GasArgs) -> Result<u64> {
    let data = decode_hex(&args.data)?;
    let schedule = if args.frontier {
        GasSchedule::frontier()
    } else {
        GasSchedule::homestead()
    };
    Ok(base_gas_required(args.creation, &data, &schedule))
}

// ---------------------------------------------------------------------------
// keygen
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct KeygenOutput {
    pub address: Address,
    /// Present only when the secret was not written to a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

pub fn keygen(args: &KeygenArgs) -> Result<KeygenOutput> {
    let key = KeyPair::generate();
    let secret = hex::encode(key.secret_bytes());

    let Some(path) = &args.out else {
        return Ok(KeygenOutput {
            address: key.address(),
            secret: Some(secret),
        });
    };

    fs::write(path, &secret)
        .with_context(|| format!("failed to write key to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
    }

    tracing::info!(address = ?key.address(), path = %path.display(), "key generated");
    Ok(KeygenOutput {
        address: key.address(),
        secret: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
