//! # Hashing Utilities
//!
//! Keccak-256 is the only digest the transaction layer needs. It identifies
//! a signed transaction (`hash()`), it is the value actually signed
//! (`digest_unsigned()`), and it turns a recovered public key into an
//! address.
//!
//! Note that this is the original Keccak submission padding, *not* the
//! finalized FIPS-202 SHA3-256. The two disagree on every input, so do not
//! swap in `sha3::Sha3_256` thinking it is equivalent.

use ethereum_types::H256;
use tiny_keccak::{Hasher as KeccakHasher, Keccak};

/// Keccak-256 of the empty byte string.
///
/// This is what an `Empty` placeholder transaction hashes to, since it
/// encodes to zero bytes.
pub const KECCAK_EMPTY: H256 = H256([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Compute the Keccak-256 hash of the input data.
///
/// # Example
///
/// ```
/// use ledger_tx::crypto::{keccak256, KECCAK_EMPTY};
///
/// assert_eq!(keccak256(b""), KECCAK_EMPTY);
/// ```
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    H256(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
