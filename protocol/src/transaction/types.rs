//! Core type definitions for ledger transactions.
//!
//! Small `Copy` enums that select encoding and validation behaviour, the
//! sentinel addresses, and the serializable [`TransactionSummary`] used for
//! display and logging.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use ethereum_types::{Address, H160, H256, U256};

use super::builder::Transaction;
use crate::crypto::SignatureStruct;

/// Sender reported for the zero-signature placeholder: not a real signer.
pub const MAX_ADDRESS: Address = H160([0xff; 20]);

// ---------------------------------------------------------------------------
// TransactionKind
// ---------------------------------------------------------------------------

/// What a transaction does, derived from its recipient and extension marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Placeholder that was never meant to be sent. Encodes to zero bytes.
    #[default]
    Empty,
    /// Deploys code. No recipient.
    ContractCreation,
    /// Transfers value to, or calls code at, a recipient.
    MessageCall,
    /// A message call that also carries an auxiliary content digest after
    /// the signature.
    ExtensionPayload,
}

impl TransactionKind {
    /// Whether the recipient slot is emitted on the wire.
    pub fn has_recipient(&self) -> bool {
        matches!(self, Self::MessageCall | Self::ExtensionPayload)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::ContractCreation => write!(f, "ContractCreation"),
            Self::MessageCall => write!(f, "MessageCall"),
            Self::ExtensionPayload => write!(f, "ExtensionPayload"),
        }
    }
}

// ---------------------------------------------------------------------------
// CheckTransaction
// ---------------------------------------------------------------------------

/// How much work [`Transaction::decode`] does beyond parsing.
///
/// Levels are ordered: each one includes the checks of the one before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckTransaction {
    /// Structure only.
    None,
    /// Structure plus signature shape (`r`, `s` in range, recovery id 0/1).
    Cheap,
    /// Everything in `Cheap`, then recover and cache the sender.
    Everything,
}

// ---------------------------------------------------------------------------
// IncludeSignature
// ---------------------------------------------------------------------------

/// Selects the signed encoding or the unsigned signing preimage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeSignature {
    Without,
    With,
}

// ---------------------------------------------------------------------------
// TransactionSummary
// ---------------------------------------------------------------------------

/// Read-only snapshot of a transaction for display, logging and JSON output.
///
/// Built with [`Transaction::safe_sender`], so producing a summary never
/// fails even when the signature does not recover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub hash: Option<H256>,
    pub sender: Address,
    pub kind: TransactionKind,
    pub nonce: U256,
    pub gas_price: U256,
    pub gas: U256,
    pub to: Option<Address>,
    pub value: U256,
    /// Hex-encoded payload, `0x`-prefixed.
    pub data: String,
    pub chain_id: i64,
    pub signature: Option<SignatureStruct>,
    pub extension_digest: Option<H256>,
}

impl From<&Transaction> for TransactionSummary {
    fn from(tx: &Transaction) -> Self {
        Self {
            hash: tx.hash().ok(),
            sender: tx.safe_sender(),
            kind: tx.kind(),
            nonce: tx.nonce(),
            gas_price: tx.gas_price(),
            gas: tx.gas(),
            to: tx.recipient(),
            value: tx.value(),
            data: format!("0x{}", hex::encode(tx.data())),
            chain_id: tx.chain_id(),
            signature: tx.signature().copied(),
            extension_digest: tx.extension_digest(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
