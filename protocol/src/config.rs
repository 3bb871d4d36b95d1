//! # Protocol Configuration & Constants
//!
//! Every magic number the transaction layer depends on lives here: the
//! chain-id sentinel, the secp256k1 group order, the `v` offsets, and the
//! gas schedules used for the intrinsic-cost check.
//!
//! The two runtime-tunable pieces, [`GasSchedule`] and [`ValidationPolicy`],
//! are plain serde structs so an integrating node (or the `ledger-tx` CLI)
//! can load them from a JSON file.

use ethereum_types::U256;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chain Identifiers
// ---------------------------------------------------------------------------

/// Sentinel chain id carried by pre-replay-protection signatures
/// (`v ∈ {27, 28}`). Such a signature is valid on any chain.
///
/// The value is chosen so that `2 * LEGACY_CHAIN_ID + V_OFFSET == 27`, which
/// lets one formula encode and decode both legacy and protected `v` values.
pub const LEGACY_CHAIN_ID: i64 = -4;

/// Main network.
pub const CHAIN_ID_MAINNET: u64 = 1;

/// Public test network.
pub const CHAIN_ID_TESTNET: u64 = 3;

/// Local development network.
pub const CHAIN_ID_DEVNET: u64 = 17;

// ---------------------------------------------------------------------------
// Signature Encoding
// ---------------------------------------------------------------------------

/// First `v` value of a legacy (unprotected) signature.
pub const LEGACY_V_BASE: u64 = 27;

/// EIP-155 offset: `v = recovery_id + 2 * chain_id + V_OFFSET`.
pub const V_OFFSET: i64 = 35;

/// Replay-protected `v` values start strictly above this bound.
pub const MAX_UNPROTECTED_V: u64 = 36;

/// Largest chain id whose protected `v` still fits in a `u64`.
pub const MAX_CHAIN_ID: u64 = (u64::MAX - 36) / 2;

/// Order of the secp256k1 group:
/// `0xFFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141`.
pub const SECP256K1_N: U256 = U256([
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

/// `SECP256K1_N / 2`. Canonical (low-S) signatures have `s` at or below this.
pub const SECP256K1_HALF_N: U256 = U256([
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
]);

// ---------------------------------------------------------------------------
// Wire Layout
// ---------------------------------------------------------------------------

/// Fields in an unsigned transaction body (nonce through data).
pub const UNSIGNED_FIELD_COUNT: usize = 7;

/// Fields in a signed transaction without the extension digest.
pub const SIGNED_FIELD_COUNT: usize = 10;

/// Upper bound on top-level fields: signed plus the extension digest.
pub const MAX_FIELD_COUNT: usize = 11;

// ---------------------------------------------------------------------------
// Gas Schedule
// ---------------------------------------------------------------------------

/// Per-transaction intrinsic costs.
///
/// Only the four numbers the intrinsic-gas formula needs. The execution
/// engine owns the rest of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasSchedule {
    /// Base cost of a contract-creating transaction.
    pub tx_create_gas: u64,
    /// Base cost of any other transaction.
    pub tx_gas: u64,
    /// Cost per zero byte of payload.
    pub tx_data_zero_gas: u64,
    /// Cost per non-zero byte of payload.
    pub tx_data_non_zero_gas: u64,
}

impl GasSchedule {
    /// Launch schedule: creation costs the same as a call.
    pub const fn frontier() -> Self {
        Self {
            tx_create_gas: 21_000,
            tx_gas: 21_000,
            tx_data_zero_gas: 4,
            tx_data_non_zero_gas: 68,
        }
    }

    /// Schedule with the creation surcharge. This is the default.
    pub const fn homestead() -> Self {
        Self {
            tx_create_gas: 53_000,
            ..Self::frontier()
        }
    }
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self::homestead()
    }
}

// ---------------------------------------------------------------------------
// Validation Policy
// ---------------------------------------------------------------------------

/// Admission rules applied by
/// [`verify_transaction`](crate::transaction::verify_transaction).
///
/// The codec itself is lenient in one place: legacy `v = 27/28` signatures
/// pass [`check_chain_id`](crate::transaction::Transaction::check_chain_id)
/// for every chain. Whether a given network still accepts them is a policy
/// decision, so it lives here instead of in the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Chain the transaction must be bound to.
    pub chain_id: i64,
    /// Accept signatures without replay protection.
    pub allow_legacy_signatures: bool,
    /// Reject the high-S twin of every signature.
    pub require_low_s: bool,
    /// Accept the zero-signature placeholder (sender `0xff…ff`).
    pub allow_zero_signature: bool,
    /// Intrinsic-gas schedule checked against the declared gas limit.
    pub schedule: GasSchedule,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            chain_id: CHAIN_ID_MAINNET as i64,
            allow_legacy_signatures: true,
            require_low_s: true,
            allow_zero_signature: false,
            schedule: GasSchedule::default(),
        }
    }
}

impl ValidationPolicy {
    /// Default policy bound to a specific chain.
    pub fn for_chain(chain_id: u64) -> Self {
        Self {
            chain_id: chain_id as i64,
            ..Self::default()
        }
    }
}
