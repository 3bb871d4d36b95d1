//! Error type for every fallible transaction operation.
//!
//! Each variant is one failure category. The
//! [`TransactionException`](crate::exception::TransactionException)
//! classifier is a total mapping over these variants.

use ethereum_types::U256;
use rlp::DecoderError;
use thiserror::Error;

/// Errors produced while decoding, encoding, signing or checking a
/// transaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransactionError {
    /// Well-formed RLP with the wrong shape for a transaction.
    #[error("invalid transaction format: {reason}")]
    InvalidFormat { reason: &'static str },

    /// The RLP itself is malformed (bad lengths, leading zeros, wrong
    /// fixed-size field width, missing items).
    #[error("malformed RLP: {0}")]
    Rlp(#[from] DecoderError),

    /// Signature out of range, unrecoverable, bound to another chain, or
    /// high-S where low-S is required.
    #[error("invalid signature")]
    InvalidSignature,

    /// A signature-dependent operation ran on a transaction with no
    /// signature.
    #[error("transaction is unsigned")]
    Unsigned,

    /// The declared gas limit does not cover the intrinsic cost.
    #[error("intrinsic gas too low: requires {required}, gas limit is {provided}")]
    OutOfGasIntrinsic { required: u64, provided: U256 },

    /// A decode failure annotated with the raw input.
    #[error("invalid transaction: {source}; RLP: {rlp}")]
    Malformed {
        /// Hex of the bytes that failed to decode.
        rlp: String,
        source: Box<TransactionError>,
    },
}

impl TransactionError {
    /// The underlying cause, with any `Malformed` annotation stripped.
    pub fn root(&self) -> &TransactionError {
        match self {
            Self::Malformed { source, .. } => source.root(),
            other => other,
        }
    }
}
