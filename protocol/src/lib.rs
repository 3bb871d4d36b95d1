// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ledger-tx: Signed Transaction Core
//!
//! One ledger transaction, end to end: build it, encode it to RLP, hash it,
//! sign it over secp256k1 with EIP-155 replay protection, decode it strictly
//! from untrusted bytes, recover who signed it, and classify whatever went
//! wrong along the way.
//!
//! ## Architecture
//!
//! - **config**: protocol constants, gas schedules and the validation policy.
//! - **crypto**: Keccak-256, secp256k1 keys, recoverable signatures.
//! - **transaction**: the entity, its wire format, signing and admission checks.
//! - **exception**: the failure taxonomy callers report.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ledger_tx::crypto::KeyPair;
//! use ledger_tx::transaction::{CheckTransaction, Transaction, TransactionBuilder};
//!
//! let key = KeyPair::generate();
//! let tx = TransactionBuilder::new()
//!     .to("0x3535353535353535353535353535353535353535".parse().unwrap())
//!     .gas(21_000u64)
//!     .chain_id(1)
//!     .sign(&key)
//!     .unwrap();
//!
//! let wire = tx.encode().unwrap();
//! let decoded = Transaction::decode(&wire, CheckTransaction::Everything).unwrap();
//! assert_eq!(decoded.sender().unwrap(), key.address());
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Decoding never trusts its input. Malformed bytes are an error, never a
//!    panic.
//! 2. A transaction's content does not change after construction, so its
//!    cached hash and sender cannot go stale.
//! 3. Every failure has exactly one code.

pub mod config;
pub mod crypto;
pub mod exception;
pub mod transaction;

pub use exception::{classify, classify_result, ExecutionError, TransactionException};
pub use transaction::{
    verify_transaction, CheckTransaction, IncludeSignature, Transaction, TransactionBuilder,
    TransactionError, TransactionKind,
};
