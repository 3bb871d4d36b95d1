//! # Transaction Module
//!
//! The signed transaction entity: construction, RLP encoding, hashing,
//! signing with EIP-155 replay protection, sender recovery, and the
//! admission checks a node runs before accepting a transaction.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        Kind / check-level / include-signature enums, summary
//! error.rs        TransactionError
//! builder.rs      Transaction entity, TransactionSkeleton, TransactionBuilder
//! encoding.rs     RLP decode/encode and hashing
//! signing.rs      v codec, signing, sender recovery, low-S and chain-id checks
//! gas.rs          Intrinsic gas
//! verification.rs Policy-driven admission checks
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] assembles a [`TransactionSkeleton`].
//! 2. **Sign**: [`TransactionBuilder::sign`] or [`Transaction::sign`].
//! 3. **Encode**: [`Transaction::encode`] produces the wire bytes.
//! 4. **Decode**: peers call [`Transaction::decode`] with a [`CheckTransaction`] level.
//! 5. **Verify**: [`verify_transaction`] applies the node's policy.
//!
//! ## Design Decisions
//!
//! - Content is immutable after construction except through `sign`, so the
//!   sender and hash caches are write-once cells with no invalidation logic
//!   beyond what `sign` does.
//! - Public-key recovery goes through the
//!   [`PublicKeyRecovery`](crate::crypto::PublicKeyRecovery) trait.
//! - Legacy (`v = 27/28`) signatures pass the chain-id check for every chain;
//!   whether to admit them is a [`ValidationPolicy`](crate::config::ValidationPolicy) flag.

pub mod builder;
pub mod encoding;
pub mod error;
pub mod gas;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{Transaction, TransactionBuilder, TransactionSkeleton};
pub use error::TransactionError;
pub use gas::base_gas_required;
pub use types::{
    Address, CheckTransaction, IncludeSignature, TransactionKind, TransactionSummary, H256,
    MAX_ADDRESS, U256,
};
pub use verification::verify_transaction;
