//! Signing, sender recovery, and the `v` value codec.
//!
//! The wire `v` folds the recovery id and the chain id into one integer:
//!
//! ```text
//! v = recovery_id + 2 * chain_id + 35      (chain_id = LEGACY_CHAIN_ID gives 27/28)
//! ```
//!
//! The zero-signature placeholder is the exception: its `v` is the chain id
//! itself.

use ethereum_types::{Address, U256};
use once_cell::sync::OnceCell;
use tracing::{debug, trace, warn};

use super::builder::Transaction;
use super::error::TransactionError;
use super::types::MAX_ADDRESS;
use crate::config::{LEGACY_CHAIN_ID, LEGACY_V_BASE, MAX_CHAIN_ID, MAX_UNPROTECTED_V, V_OFFSET};
use crate::crypto::{public_to_address, KeyPair, PublicKeyRecovery, Secp256k1Recovery, SignatureStruct};

/// Split a wire `v` (plus `r`, `s`) into a chain id and a signature with a
/// raw recovery id.
pub(super) fn decode_v(v: u64, r: U256, s: U256) -> Result<(i64, SignatureStruct), TransactionError> {
    if r.is_zero() && s.is_zero() {
        // Must stay signable: a real signature needs 2 * chain_id + 36 to fit.
        if v > MAX_CHAIN_ID {
            return Err(TransactionError::InvalidSignature);
        }
        return Ok((v as i64, SignatureStruct::zero()));
    }

    let chain_id = if v > MAX_UNPROTECTED_V {
        ((v - V_OFFSET as u64) / 2) as i64
    } else if v == LEGACY_V_BASE || v == LEGACY_V_BASE + 1 {
        LEGACY_CHAIN_ID
    } else {
        return Err(TransactionError::InvalidSignature);
    };

    let recovery_id = i128::from(v) - (i128::from(chain_id) * 2 + i128::from(V_OFFSET));
    let recovery_id = u8::try_from(recovery_id).map_err(|_| TransactionError::InvalidSignature)?;
    Ok((chain_id, SignatureStruct::new(r, s, recovery_id)))
}

impl Transaction {
    /// Wire `v` for `signature` under this transaction's chain id.
    pub(super) fn encode_v(&self, signature: &SignatureStruct) -> Result<u64, TransactionError> {
        let v = if signature.is_zero() {
            i128::from(self.chain_id)
        } else {
            i128::from(signature.v) + i128::from(self.chain_id) * 2 + i128::from(V_OFFSET)
        };
        u64::try_from(v).map_err(|_| TransactionError::InvalidFormat {
            reason: "chain id does not fit in a v value",
        })
    }

    /// Sign with `keypair`, replacing any existing signature.
    ///
    /// The signature commits to [`Transaction::digest_unsigned`], so to the
    /// chain id as well when it is positive. The cached hash is dropped and
    /// the sender cache is seeded with the key's address. Chain id 0 has no
    /// decodable protected `v` and is refused, as is any chain id above
    /// [`MAX_CHAIN_ID`].
    pub fn sign(&mut self, keypair: &KeyPair) -> Result<(), TransactionError> {
        if self.chain_id == 0 {
            return Err(TransactionError::InvalidFormat {
                reason: "chain id 0 cannot carry a replay-protected signature",
            });
        }
        if self.chain_id > MAX_CHAIN_ID as i64 {
            return Err(TransactionError::InvalidFormat {
                reason: "chain id does not fit in a protected v value",
            });
        }

        let digest = self.digest_unsigned();
        let signature = keypair.sign_digest(&digest).map_err(|err| {
            warn!(error = %err, "transaction signing failed");
            TransactionError::InvalidSignature
        })?;
        if !signature.is_valid() {
            warn!("signer produced a non-canonical signature, discarding it");
            return Err(TransactionError::InvalidSignature);
        }

        self.signature = Some(signature);
        self.hash = OnceCell::new();
        self.sender = OnceCell::with_value(keypair.address());

        debug!(
            sender = ?keypair.address(),
            chain_id = self.chain_id,
            "signed transaction"
        );
        Ok(())
    }

    /// The account that signed this transaction, recovered once and cached.
    ///
    /// The zero-signature placeholder reports [`MAX_ADDRESS`].
    pub fn sender(&self) -> Result<Address, TransactionError> {
        self.sender_with(&Secp256k1Recovery)
    }

    /// [`Transaction::sender`] with an explicit recovery backend.
    ///
    /// A successful recovery is cached, so the backend runs once per
    /// signature. Failures are not cached.
    pub fn sender_with<R>(&self, recovery: &R) -> Result<Address, TransactionError>
    where
        R: PublicKeyRecovery + ?Sized,
    {
        self.sender
            .get_or_try_init(|| {
                let signature = self.signature.as_ref().ok_or(TransactionError::Unsigned)?;
                if signature.is_zero() {
                    return Ok(MAX_ADDRESS);
                }
                let public = recovery
                    .recover(signature, &self.digest_unsigned())
                    .ok_or(TransactionError::InvalidSignature)?;
                let sender = public_to_address(&public);
                trace!(sender = ?sender, "recovered transaction sender");
                Ok(sender)
            })
            .copied()
    }

    /// Like [`Transaction::sender`], but reports the zero address instead of
    /// failing.
    pub fn safe_sender(&self) -> Address {
        match self.sender() {
            Ok(sender) => sender,
            Err(err) => {
                debug!(error = %err, "sender unavailable, reporting zero address");
                Address::zero()
            }
        }
    }

    /// Reject the high-S twin of a signature.
    pub fn check_low_s(&self) -> Result<(), TransactionError> {
        let signature = self.signature.as_ref().ok_or(TransactionError::Unsigned)?;
        if !signature.is_low_s() {
            return Err(TransactionError::InvalidSignature);
        }
        Ok(())
    }

    /// Reject a signature bound to a chain other than `expected`.
    ///
    /// Legacy signatures carry no chain and pass for every `expected`.
    pub fn check_chain_id(&self, expected: i64) -> Result<(), TransactionError> {
        if self.chain_id != expected && self.chain_id != LEGACY_CHAIN_ID {
            return Err(TransactionError::InvalidSignature);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
