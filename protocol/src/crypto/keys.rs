//! # Key Management
//!
//! secp256k1 keypairs and the public-key → address mapping.
//!
//! An address is the low 160 bits of `keccak256` over the 64-byte
//! uncompressed public key (no `0x04` prefix). Recovery produces a public
//! key, so [`public_to_address`] is how a signature becomes a sender.
//!
//! Key bytes are never logged and `KeyPair`'s `Debug` only shows the
//! address.

use ethereum_types::{Address, H256};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use super::hash::keccak256;
use super::signatures::{self, Public, SignatureError, SignatureStruct};

/// Errors that can occur during key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,
}

/// A secp256k1 signing key together with its derived identity.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct from a raw 32-byte secret scalar.
    ///
    /// Fails for zero or for values at or above the group order.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(secret).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct from a hex-encoded secret, with or without `0x`.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.trim().trim_start_matches("0x");
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidSecretKey)?;
        if bytes.len() != 32 {
            return Err(KeyError::InvalidSecretKey);
        }
        Self::from_bytes(&bytes)
    }

    /// The secret scalar, big-endian.
    pub fn secret_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    pub fn public(&self) -> Public {
        let point = PublicKey::from(self.signing_key.verifying_key()).to_encoded_point(false);
        Public::from_slice(&point.as_bytes()[1..])
    }

    pub fn address(&self) -> Address {
        public_to_address(&self.public())
    }

    /// Sign a 32-byte digest. See [`signatures::sign`].
    pub fn sign_digest(&self, digest: &H256) -> Result<SignatureStruct, SignatureError> {
        signatures::sign(self, digest)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Address of a public key: the last 20 bytes of its Keccak-256.
pub fn public_to_address(public: &Public) -> Address {
    Address::from_slice(&keccak256(public.as_bytes()).as_bytes()[12..])
}
