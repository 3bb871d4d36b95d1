//! # Cryptographic Primitives
//!
//! Thin, typed wrappers over audited crates:
//!
//! - **Keccak-256** (`tiny-keccak`) for transaction hashes, signing digests
//!   and address derivation.
//! - **secp256k1 ECDSA** (`k256`) for recoverable signatures.
//!
//! The transaction layer consumes these as pure functions. Nothing in here
//! holds state beyond a `KeyPair`'s secret.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{keccak256, KECCAK_EMPTY};
pub use keys::{public_to_address, KeyError, KeyPair};
pub use signatures::{
    recover, sign, Public, PublicKeyRecovery, Secp256k1Recovery, SignatureError, SignatureStruct,
};
