//! RLP wire format.
//!
//! ```text
//! signed:    [nonce, gasPrice, gas, marker, to, value, data, v, r, s (, digest)]
//! preimage:  [nonce, gasPrice, gas, marker, to, value, data (, digest) (, chainId, 0, 0, 0)]
//! ```
//!
//! `marker` is empty except on extension-payload transactions; `to` is empty
//! for contract creation; the `digest` is present only on extension-payload
//! transactions. The preimage gets the four-item EIP-155 suffix only when the
//! chain id is positive.

use ethereum_types::{Address, H256, U256};
use once_cell::sync::OnceCell;
use rlp::{Rlp, RlpStream};
use tracing::{debug, trace};

use super::builder::Transaction;
use super::error::TransactionError;
use super::signing::decode_v;
use super::types::{CheckTransaction, IncludeSignature, TransactionKind};
use crate::config::{MAX_FIELD_COUNT, SIGNED_FIELD_COUNT, UNSIGNED_FIELD_COUNT};
use crate::crypto::keccak256;

/// Value written in the marker slot of an extension-payload transaction.
const EXTENSION_MARKER: u8 = 1;

impl Transaction {
    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    /// Parse a signed transaction from its RLP encoding.
    ///
    /// `check` selects how much is verified beyond structure; see
    /// [`CheckTransaction`]. Every failure comes back as
    /// [`TransactionError::Malformed`] carrying the input as hex; use
    /// [`TransactionError::root`] to get at the cause.
    ///
    /// A non-extension transaction may carry an eleventh field as long as it
    /// is blank (empty or a zero digest). That slot is not kept: re-encoding
    /// gives the ten-field form, and [`Transaction::hash`] is the hash of that
    /// form rather than of `bytes`.
    pub fn decode(bytes: &[u8], check: CheckTransaction) -> Result<Self, TransactionError> {
        Self::decode_fields(bytes, check).map_err(|err| {
            debug!(error = %err, len = bytes.len(), "rejecting transaction RLP");
            TransactionError::Malformed {
                rlp: hex::encode(bytes),
                source: Box::new(err),
            }
        })
    }

    fn decode_fields(bytes: &[u8], check: CheckTransaction) -> Result<Self, TransactionError> {
        let rlp = Rlp::new(bytes);
        if !rlp.is_list() {
            return Err(TransactionError::InvalidFormat {
                reason: "transaction RLP must be a list",
            });
        }
        if rlp.payload_info()?.total() != bytes.len() {
            return Err(TransactionError::InvalidFormat {
                reason: "trailing bytes after transaction RLP",
            });
        }

        let item_count = rlp.item_count()?;
        if item_count > MAX_FIELD_COUNT {
            return Err(TransactionError::InvalidFormat {
                reason: "too many fields in the transaction RLP",
            });
        }
        if item_count < SIGNED_FIELD_COUNT {
            return Err(TransactionError::InvalidFormat {
                reason: "too few fields in the transaction RLP",
            });
        }

        let nonce: U256 = rlp.val_at(0)?;
        let gas_price: U256 = rlp.val_at(1)?;
        let gas: U256 = rlp.val_at(2)?;

        let to = rlp.at(4)?;
        let kind = if !rlp.at(3)?.is_empty() {
            TransactionKind::ExtensionPayload
        } else if to.is_empty() {
            TransactionKind::ContractCreation
        } else {
            TransactionKind::MessageCall
        };
        let recipient = if to.is_empty() {
            None
        } else {
            Some(to.as_val::<Address>()?)
        };
        if kind == TransactionKind::ExtensionPayload && recipient.is_none() {
            return Err(TransactionError::InvalidFormat {
                reason: "extension payload needs a recipient",
            });
        }

        let value: U256 = rlp.val_at(5)?;

        let data = rlp.at(6)?;
        if !data.is_data() {
            return Err(TransactionError::InvalidFormat {
                reason: "transaction data RLP must be an array",
            });
        }
        let data = data.data()?.to_vec();

        let v: u64 = rlp.val_at(7)?;
        let r: U256 = rlp.val_at(8)?;
        let s: U256 = rlp.val_at(9)?;
        let (chain_id, signature) = decode_v(v, r, s)?;

        if check >= CheckTransaction::Cheap && !signature.is_zero() && !signature.is_valid() {
            return Err(TransactionError::InvalidSignature);
        }

        let extension_digest = match kind {
            TransactionKind::ExtensionPayload => {
                if item_count < MAX_FIELD_COUNT {
                    return Err(TransactionError::InvalidFormat {
                        reason: "extension payload is missing its digest",
                    });
                }
                let digest: H256 = rlp.val_at(SIGNED_FIELD_COUNT)?;
                (!digest.is_zero()).then_some(digest)
            }
            _ => {
                if item_count == MAX_FIELD_COUNT && !is_blank_digest(&rlp.at(SIGNED_FIELD_COUNT)?) {
                    return Err(TransactionError::InvalidFormat {
                        reason: "unexpected digest on a non-extension transaction",
                    });
                }
                None
            }
        };

        let tx = Self {
            kind,
            nonce,
            gas_price,
            gas,
            recipient,
            value,
            data,
            signature: Some(signature),
            chain_id,
            extension_digest,
            sender: OnceCell::new(),
            hash: OnceCell::new(),
        };

        if check == CheckTransaction::Everything {
            tx.sender()?;
        }

        trace!(kind = %tx.kind, nonce = %tx.nonce, chain_id = tx.chain_id, "decoded transaction");
        Ok(tx)
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    /// RLP encoding of the transaction.
    ///
    /// `With` needs a signature and fails with [`TransactionError::Unsigned`]
    /// otherwise. `Without` gives the bare seven-field body, without the
    /// EIP-155 suffix; see [`Transaction::digest`] for the signing preimage.
    /// An `Empty` transaction encodes to no bytes at all.
    pub fn rlp_bytes(&self, include: IncludeSignature) -> Result<Vec<u8>, TransactionError> {
        match include {
            IncludeSignature::With => self.signed_rlp(),
            IncludeSignature::Without => Ok(self.unsigned_rlp()),
        }
    }

    /// Signed wire encoding. Shorthand for `rlp_bytes(IncludeSignature::With)`.
    pub fn encode(&self) -> Result<Vec<u8>, TransactionError> {
        self.signed_rlp()
    }

    fn signed_rlp(&self) -> Result<Vec<u8>, TransactionError> {
        if self.kind == TransactionKind::Empty {
            return Ok(Vec::new());
        }
        let signature = self.signature.as_ref().ok_or(TransactionError::Unsigned)?;
        let extension = self.kind == TransactionKind::ExtensionPayload;

        let mut stream =
            RlpStream::new_list(if extension { MAX_FIELD_COUNT } else { SIGNED_FIELD_COUNT });
        self.append_body(&mut stream);
        let v = self.encode_v(signature)?;
        stream
            .append(&v)
            .append(&signature.r)
            .append(&signature.s);
        if extension {
            stream.append(&self.extension_digest.unwrap_or_default());
        }
        Ok(stream.out().to_vec())
    }

    fn unsigned_rlp(&self) -> Vec<u8> {
        if self.kind == TransactionKind::Empty {
            return Vec::new();
        }
        let mut stream = RlpStream::new_list(UNSIGNED_FIELD_COUNT);
        self.append_body(&mut stream);
        stream.out().to_vec()
    }

    /// The list a signature commits to: the body, the extension digest slot
    /// of an extension payload, and the EIP-155 suffix for a positive chain id.
    fn signing_preimage(&self) -> Vec<u8> {
        if self.kind == TransactionKind::Empty {
            return Vec::new();
        }
        let extension = self.kind == TransactionKind::ExtensionPayload;
        let suffix = self.chain_id > 0;

        let mut stream = RlpStream::new_list(
            UNSIGNED_FIELD_COUNT + usize::from(extension) + if suffix { 4 } else { 0 },
        );
        self.append_body(&mut stream);
        if extension {
            stream.append(&self.extension_digest.unwrap_or_default());
        }
        if suffix {
            stream
                .append(&(self.chain_id as u64))
                .append(&0u8)
                .append(&0u8)
                .append(&0u8);
        }
        stream.out().to_vec()
    }

    fn append_body(&self, stream: &mut RlpStream) {
        stream
            .append(&self.nonce)
            .append(&self.gas_price)
            .append(&self.gas);
        if self.kind == TransactionKind::ExtensionPayload {
            stream.append(&EXTENSION_MARKER);
        } else {
            stream.append_empty_data();
        }
        match self.recipient {
            Some(ref to) => stream.append(to),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value).append(&self.data);
    }

    // -----------------------------------------------------------------------
    // Hashing
    // -----------------------------------------------------------------------

    /// Keccak-256 of the signed encoding (`With`) or of the signing preimage
    /// (`Without`).
    ///
    /// An extension-payload transaction that carries a digest reports that
    /// digest for both forms. The signed hash is computed at most once per
    /// signature.
    pub fn digest(&self, include: IncludeSignature) -> Result<H256, TransactionError> {
        if self.kind == TransactionKind::ExtensionPayload {
            if let Some(digest) = self.extension_digest {
                return Ok(digest);
            }
        }
        match include {
            IncludeSignature::With => self
                .hash
                .get_or_try_init(|| self.signed_rlp().map(|rlp| keccak256(&rlp)))
                .copied(),
            IncludeSignature::Without => Ok(self.digest_unsigned()),
        }
    }

    /// Transaction hash: the digest of the signed encoding.
    pub fn hash(&self) -> Result<H256, TransactionError> {
        self.digest(IncludeSignature::With)
    }

    /// The digest a signature over this transaction commits to.
    ///
    /// Always computed over the content, so every field of an
    /// extension payload is covered even though its [`Transaction::hash`] is
    /// the attached digest.
    pub fn digest_unsigned(&self) -> H256 {
        keccak256(&self.signing_preimage())
    }
}

/// An empty item or an all-zero 32-byte digest.
fn is_blank_digest(item: &Rlp<'_>) -> bool {
    item.is_empty() || item.as_val::<H256>().map(|h| h.is_zero()).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
