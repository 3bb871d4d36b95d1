//! # Recoverable Signatures
//!
//! secp256k1 ECDSA over a 32-byte digest, in the `(r, s, recovery id)` form
//! the transaction wire format carries. Nothing here knows about chain ids
//! or the `v` offset; that mapping belongs to the transaction codec.
//!
//! Recovery is exposed twice: as the free function [`recover`], and through
//! the [`PublicKeyRecovery`] trait. The transaction entity only ever talks to
//! the trait, which is what lets tests count how often recovery actually
//! runs.

use ethereum_types::{H256, H512, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, PublicKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::keys::KeyPair;
use crate::config::{SECP256K1_HALF_N, SECP256K1_N};

/// Uncompressed secp256k1 public key without the `0x04` prefix.
pub type Public = H512;

/// Errors during signature operations.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signing failed")]
    SigningFailed,
}

/// An ECDSA signature in wire form.
///
/// `v` is the raw recovery id (0 or 1 for anything produced by [`sign`]),
/// not the offset value that appears on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureStruct {
    pub r: U256,
    pub s: U256,
    pub v: u8,
}

impl SignatureStruct {
    pub fn new(r: U256, s: U256, v: u8) -> Self {
        Self { r, s, v }
    }

    /// The `r = s = 0` placeholder used to carry a chain id on an unsigned
    /// transaction.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.r.is_zero() && self.s.is_zero()
    }

    /// Structural validity: recovery id in `{0, 1}` and both scalars in
    /// `[1, n)`. Says nothing about whether the signature verifies.
    pub fn is_valid(&self) -> bool {
        self.v <= 1
            && !self.r.is_zero()
            && !self.s.is_zero()
            && self.r < SECP256K1_N
            && self.s < SECP256K1_N
    }

    /// `true` if `s` is in the lower half of the group order.
    pub fn is_low_s(&self) -> bool {
        self.s <= SECP256K1_HALF_N
    }

    fn to_k256(self) -> Option<(Signature, RecoveryId)> {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        self.r.to_big_endian(&mut r);
        self.s.to_big_endian(&mut s);

        let signature =
            Signature::from_scalars(FieldBytes::clone_from_slice(&r), FieldBytes::clone_from_slice(&s))
                .ok()?;
        let recovery_id = RecoveryId::from_byte(self.v)?;

        // k256 only recovers from normalized signatures. Flipping s to n - s
        // mirrors the point, so the y-parity bit flips with it.
        Some(match signature.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (signature, recovery_id),
        })
    }
}

/// Sign a 32-byte digest.
///
/// k256 produces low-S signatures, so the result always passes
/// [`SignatureStruct::is_low_s`].
pub fn sign(keypair: &KeyPair, digest: &H256) -> Result<SignatureStruct, SignatureError> {
    let (signature, recovery_id) = keypair
        .signing_key()
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|_| SignatureError::SigningFailed)?;

    Ok(SignatureStruct {
        r: U256::from_big_endian(&signature.r().to_bytes()),
        s: U256::from_big_endian(&signature.s().to_bytes()),
        v: recovery_id.to_byte(),
    })
}

/// Recover the public key that produced `signature` over `digest`.
///
/// Returns `None` for out-of-range scalars, an unusable recovery id, or a
/// signature that has no valid public key.
pub fn recover(signature: &SignatureStruct, digest: &H256) -> Option<Public> {
    let (signature, recovery_id) = signature.to_k256()?;
    let key = VerifyingKey::recover_from_prehash(digest.as_bytes(), &signature, recovery_id).ok()?;
    let point = PublicKey::from(&key).to_encoded_point(false);
    Some(Public::from_slice(&point.as_bytes()[1..]))
}

/// Public-key recovery as a pluggable primitive.
pub trait PublicKeyRecovery {
    fn recover(&self, signature: &SignatureStruct, digest: &H256) -> Option<Public>;
}

/// The production recovery backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Recovery;

impl PublicKeyRecovery for Secp256k1Recovery {
    fn recover(&self, signature: &SignatureStruct, digest: &H256) -> Option<Public> {
        recover(signature, digest)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
