//! # Failure Classification
//!
//! Every failure a transaction can run into, whether it comes from the codec
//! here or from an execution engine downstream, maps to exactly one
//! [`TransactionException`] code. Callers report the code; the error value
//! keeps the detail.
//!
//! The mapping is a pair of total `From` impls over the two tagged error
//! types. [`classify`] exists for the integration boundary, where a foreign
//! error arrives as `dyn Error`; anything it does not recognise is
//! [`TransactionException::Unknown`], which means a new failure category
//! appeared upstream and this module needs a new arm. It never means success.

use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use thiserror::Error;

use crate::transaction::TransactionError;

// ---------------------------------------------------------------------------
// ExecutionError
// ---------------------------------------------------------------------------

/// Failures raised by an execution engine while applying a transaction.
///
/// This crate never produces these itself; they are the vocabulary an engine
/// speaks so its failures classify the same way as decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("not enough gas for the base cost: requires {required}, got {got}")]
    OutOfGasBase { required: U256, got: U256 },

    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: U256, got: U256 },

    #[error("not enough cash: requires {required}, balance is {balance}")]
    NotEnoughCash { required: U256, balance: U256 },

    #[error("block gas limit reached: {used} of {limit} used, transaction needs {requested}")]
    BlockGasLimitReached {
        limit: U256,
        used: U256,
        requested: U256,
    },

    #[error("address already used: {0:?}")]
    AddressAlreadyUsed(Address),

    #[error("bad instruction")]
    BadInstruction,

    #[error("bad jump destination")]
    BadJumpDestination,

    #[error("out of gas")]
    OutOfGas,

    #[error("out of stack")]
    OutOfStack,

    #[error("stack underflow")]
    StackUnderflow,
}

// ---------------------------------------------------------------------------
// TransactionException
// ---------------------------------------------------------------------------

/// Closed taxonomy of transaction failure codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionException {
    /// No failure.
    #[default]
    None,
    BadFormat,
    OutOfGasIntrinsic,
    InvalidSignature,
    OutOfGasBase,
    InvalidNonce,
    NotEnoughCash,
    BlockGasLimitReached,
    AddressAlreadyUsed,
    BadInstruction,
    BadJumpDestination,
    OutOfGas,
    OutOfStack,
    StackUnderflow,
    /// Unrecognised failure category.
    Unknown,
}

impl TransactionException {
    pub fn is_failure(&self) -> bool {
        *self != Self::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::BadFormat => "BadFormat",
            Self::OutOfGasIntrinsic => "OutOfGasIntrinsic",
            Self::InvalidSignature => "InvalidSignature",
            Self::OutOfGasBase => "OutOfGasBase",
            Self::InvalidNonce => "InvalidNonce",
            Self::NotEnoughCash => "NotEnoughCash",
            Self::BlockGasLimitReached => "BlockGasLimitReached",
            Self::AddressAlreadyUsed => "AddressAlreadyUsed",
            Self::BadInstruction => "BadInstruction",
            Self::BadJumpDestination => "BadJumpDestination",
            Self::OutOfGas => "OutOfGas",
            Self::OutOfStack => "OutOfStack",
            Self::StackUnderflow => "StackUnderflow",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TransactionException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&TransactionError> for TransactionException {
    fn from(err: &TransactionError) -> Self {
        match err {
            TransactionError::InvalidFormat { .. } | TransactionError::Rlp(_) => Self::BadFormat,
            TransactionError::OutOfGasIntrinsic { .. } => Self::OutOfGasIntrinsic,
            TransactionError::InvalidSignature | TransactionError::Unsigned => {
                Self::InvalidSignature
            }
            TransactionError::Malformed { source, .. } => Self::from(source.as_ref()),
        }
    }
}

impl From<&ExecutionError> for TransactionException {
    fn from(err: &ExecutionError) -> Self {
        match err {
            ExecutionError::OutOfGasBase { .. } => Self::OutOfGasBase,
            ExecutionError::InvalidNonce { .. } => Self::InvalidNonce,
            ExecutionError::NotEnoughCash { .. } => Self::NotEnoughCash,
            ExecutionError::BlockGasLimitReached { .. } => Self::BlockGasLimitReached,
            ExecutionError::AddressAlreadyUsed(_) => Self::AddressAlreadyUsed,
            ExecutionError::BadInstruction => Self::BadInstruction,
            ExecutionError::BadJumpDestination => Self::BadJumpDestination,
            ExecutionError::OutOfGas => Self::OutOfGas,
            ExecutionError::OutOfStack => Self::OutOfStack,
            ExecutionError::StackUnderflow => Self::StackUnderflow,
        }
    }
}

impl From<TransactionError> for TransactionException {
    fn from(err: TransactionError) -> Self {
        Self::from(&err)
    }
}

impl From<ExecutionError> for TransactionException {
    fn from(err: ExecutionError) -> Self {
        Self::from(&err)
    }
}

// ---------------------------------------------------------------------------
// Classification at the boundary
// ---------------------------------------------------------------------------

/// Classify an arbitrary error by walking its `source()` chain.
///
/// The first link that is a [`TransactionError`], an [`ExecutionError`] or a
/// raw [`rlp::DecoderError`] decides the code. Falls back to
/// [`TransactionException::Unknown`].
pub fn classify(error: &(dyn Error + 'static)) -> TransactionException {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(err) = err.downcast_ref::<TransactionError>() {
            return err.into();
        }
        if let Some(err) = err.downcast_ref::<ExecutionError>() {
            return err.into();
        }
        if err.is::<rlp::DecoderError>() {
            return TransactionException::BadFormat;
        }
        current = err.source();
    }
    TransactionException::Unknown
}

/// [`TransactionException::None`] for `Ok`, otherwise [`classify`].
pub fn classify_result<T, E>(result: &Result<T, E>) -> TransactionException
where
    E: Error + 'static,
{
    match result {
        Ok(_) => TransactionException::None,
        Err(err) => classify(err),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rlp::DecoderError;

    #[derive(Debug, Error)]
    #[error("while importing block: {source}")]
    struct ImportError {
        source: ExecutionError,
    }

    #[derive(Debug, Error)]
    #[error("something new")]
    struct Unrelated;

    #[test]
    fn transaction_errors_map_totally() {
        let cases = [
            (
                TransactionError::InvalidFormat { reason: "x" },
                TransactionException::BadFormat,
            ),
            (
                TransactionError::Rlp(DecoderError::RlpIsTooShort),
                TransactionException::BadFormat,
            ),
            (
                TransactionError::InvalidSignature,
                TransactionException::InvalidSignature,
            ),
            (TransactionError::Unsigned, TransactionException::InvalidSignature),
            (
                TransactionError::OutOfGasIntrinsic {
                    required: 21_000,
                    provided: U256::zero(),
                },
                TransactionException::OutOfGasIntrinsic,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(TransactionException::from(&err), expected, "{:?}", err);
        }
    }

    #[test]
    fn malformed_classified_by_cause() {
        let err = TransactionError::Malformed {
            rlp: "c0".into(),
            source: Box::new(TransactionError::InvalidSignature),
        };
        assert_eq!(
            TransactionException::from(&err),
            TransactionException::InvalidSignature
        );
    }

    #[test]
    fn execution_errors_map_totally() {
        let cases = [
            (
                ExecutionError::OutOfGasBase {
                    required: U256::one(),
                    got: U256::zero(),
                },
                TransactionException::OutOfGasBase,
            ),
            (
                ExecutionError::InvalidNonce {
                    expected: U256::one(),
                    got: U256::zero(),
                },
                TransactionException::InvalidNonce,
            ),
            (
                ExecutionError::NotEnoughCash {
                    required: U256::one(),
                    balance: U256::zero(),
                },
                TransactionException::NotEnoughCash,
            ),
            (
                ExecutionError::BlockGasLimitReached {
                    limit: U256::one(),
                    used: U256::one(),
                    requested: U256::one(),
                },
                TransactionException::BlockGasLimitReached,
            ),
            (
                ExecutionError::AddressAlreadyUsed(Address::zero()),
                TransactionException::AddressAlreadyUsed,
            ),
            (ExecutionError::BadInstruction, TransactionException::BadInstruction),
            (
                ExecutionError::BadJumpDestination,
                TransactionException::BadJumpDestination,
            ),
            (ExecutionError::OutOfGas, TransactionException::OutOfGas),
            (ExecutionError::OutOfStack, TransactionException::OutOfStack),
            (ExecutionError::StackUnderflow, TransactionException::StackUnderflow),
        ];
        for (err, expected) in cases {
            assert_eq!(TransactionException::from(err), expected);
        }
    }

    #[test]
    fn classify_walks_source_chain() {
        let err = ImportError {
            source: ExecutionError::OutOfStack,
        };
        assert_eq!(classify(&err), TransactionException::OutOfStack);
    }

    #[test]
    fn classify_raw_decoder_error() {
        assert_eq!(
            classify(&DecoderError::RlpExpectedToBeList),
            TransactionException::BadFormat
        );
    }

    #[test]
    fn classify_unknown_falls_back() {
        assert_eq!(classify(&Unrelated), TransactionException::Unknown);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(classify(&io), TransactionException::Unknown);
    }

    #[test]
    fn classify_result_reports_none_on_success() {
        let ok: Result<(), TransactionError> = Ok(());
        assert_eq!(classify_result(&ok), TransactionException::None);
        assert!(!TransactionException::None.is_failure());

        let err: Result<(), TransactionError> = Err(TransactionError::Unsigned);
        assert_eq!(classify_result(&err), TransactionException::InvalidSignature);
    }

    #[test]
    fn display_and_serde_use_variant_name() {
        assert_eq!(TransactionException::OutOfGasIntrinsic.to_string(), "OutOfGasIntrinsic");
        assert_eq!(
            serde_json::to_string(&TransactionException::BadFormat).unwrap(),
            "\"BadFormat\""
        );
        assert_eq!(TransactionException::default(), TransactionException::None);
    }
}
