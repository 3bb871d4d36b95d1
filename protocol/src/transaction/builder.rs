//! The transaction entity and its construction.
//!
//! A [`Transaction`] is built either from the wire (see
//! [`Transaction::decode`]) or from a [`TransactionSkeleton`], usually
//! assembled with the fluent [`TransactionBuilder`]. Once built, the content
//! fields never change except through [`Transaction::sign`], which is also the
//! only thing that resets the derived caches.

use ethereum_types::{Address, H256, U256};
use once_cell::sync::OnceCell;
use tracing::debug;

use super::error::TransactionError;
use super::types::TransactionKind;
use crate::config::{LEGACY_CHAIN_ID, MAX_CHAIN_ID};
use crate::crypto::{KeyPair, SignatureStruct};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A single ledger transaction.
///
/// Content fields are private and exposed through accessors so that the
/// cached sender and hash can never disagree with the content they were
/// computed from.
///
/// # Signature states
///
/// - `signature == None`: unsigned. Sender queries fail with
///   [`TransactionError::Unsigned`].
/// - `signature == Some(zero)`: the `r = s = 0` placeholder carrying a chain
///   id on an unsigned transaction. Its sender is
///   [`MAX_ADDRESS`](super::types::MAX_ADDRESS).
/// - anything else: a real recoverable signature.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub(super) kind: TransactionKind,
    pub(super) nonce: U256,
    pub(super) gas_price: U256,
    pub(super) gas: U256,
    pub(super) recipient: Option<Address>,
    pub(super) value: U256,
    pub(super) data: Vec<u8>,
    pub(super) signature: Option<SignatureStruct>,
    /// Chain the signature is bound to, or [`LEGACY_CHAIN_ID`].
    pub(super) chain_id: i64,
    pub(super) extension_digest: Option<H256>,

    pub(super) sender: OnceCell<Address>,
    pub(super) hash: OnceCell<H256>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            kind: TransactionKind::Empty,
            nonce: U256::zero(),
            gas_price: U256::zero(),
            gas: U256::zero(),
            recipient: None,
            value: U256::zero(),
            data: Vec::new(),
            signature: None,
            chain_id: LEGACY_CHAIN_ID,
            extension_digest: None,
            sender: OnceCell::new(),
            hash: OnceCell::new(),
        }
    }
}

/// Equality over content only. A transaction with warm caches equals its
/// freshly decoded twin.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.nonce == other.nonce
            && self.gas_price == other.gas_price
            && self.gas == other.gas
            && self.recipient == other.recipient
            && self.value == other.value
            && self.data == other.data
            && self.signature == other.signature
            && self.chain_id == other.chain_id
            && self.extension_digest == other.extension_digest
    }
}

impl Eq for Transaction {}

impl Transaction {
    /// Build a transaction from caller-supplied fields, signing it when a key
    /// is given.
    ///
    /// Without a key, a skeleton that names a chain id gets the zero
    /// signature so the chain id survives encoding. The extension flag wins
    /// over the creation flag, and an extension payload needs a recipient.
    pub fn from_skeleton(
        skeleton: TransactionSkeleton,
        secret: Option<&KeyPair>,
    ) -> Result<Self, TransactionError> {
        let kind = if skeleton.extension {
            TransactionKind::ExtensionPayload
        } else if skeleton.creation || skeleton.to.is_none() {
            TransactionKind::ContractCreation
        } else {
            TransactionKind::MessageCall
        };

        if kind == TransactionKind::ExtensionPayload && skeleton.to.is_none() {
            return Err(TransactionError::InvalidFormat {
                reason: "extension payload needs a recipient",
            });
        }

        let chain_id = match skeleton.chain_id {
            Some(id) if id > MAX_CHAIN_ID => {
                return Err(TransactionError::InvalidFormat {
                    reason: "chain id does not fit in a protected v value",
                })
            }
            Some(id) => id as i64,
            None => LEGACY_CHAIN_ID,
        };

        let signature = match (secret, skeleton.chain_id) {
            (None, Some(_)) => Some(SignatureStruct::zero()),
            _ => None,
        };

        let mut tx = Self {
            kind,
            nonce: skeleton.nonce,
            gas_price: skeleton.gas_price,
            gas: skeleton.gas,
            recipient: if kind.has_recipient() { skeleton.to } else { None },
            value: skeleton.value,
            data: skeleton.data,
            signature,
            chain_id,
            extension_digest: match kind {
                TransactionKind::ExtensionPayload => skeleton.extension_digest,
                _ => None,
            },
            sender: OnceCell::new(),
            hash: OnceCell::new(),
        };

        if let Some(keypair) = secret {
            tx.sign(keypair)?;
        }

        debug!(
            kind = %tx.kind,
            nonce = %tx.nonce,
            chain_id = tx.chain_id,
            signed = tx.has_signature(),
            "built transaction from skeleton"
        );
        Ok(tx)
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn nonce(&self) -> U256 {
        self.nonce
    }

    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    /// Declared gas limit.
    pub fn gas(&self) -> U256 {
        self.gas
    }

    /// Destination account. `None` for contract creation.
    pub fn recipient(&self) -> Option<Address> {
        self.recipient
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn signature(&self) -> Option<&SignatureStruct> {
        self.signature.as_ref()
    }

    /// Chain id the signature is bound to; [`LEGACY_CHAIN_ID`] when it is
    /// bound to none.
    pub fn chain_id(&self) -> i64 {
        self.chain_id
    }

    pub fn extension_digest(&self) -> Option<H256> {
        self.extension_digest
    }

    pub fn is_creation(&self) -> bool {
        self.kind == TransactionKind::ContractCreation
    }

    pub fn has_signature(&self) -> bool {
        self.signature.is_some()
    }

    /// `true` for the `r = s = 0` chain-id placeholder.
    pub fn has_zero_signature(&self) -> bool {
        self.signature.as_ref().is_some_and(SignatureStruct::is_zero)
    }

    /// `true` when the signature commits to a specific chain.
    pub fn is_replay_protected(&self) -> bool {
        self.chain_id != LEGACY_CHAIN_ID
    }
}

// ---------------------------------------------------------------------------
// TransactionSkeleton
// ---------------------------------------------------------------------------

/// Plain field bag a [`Transaction`] is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionSkeleton {
    /// Force contract creation even if `to` is set.
    pub creation: bool,
    /// Build an extension-payload transaction.
    pub extension: bool,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub nonce: U256,
    pub gas: U256,
    pub gas_price: U256,
    /// `None` produces a legacy (unprotected) signature.
    pub chain_id: Option<u64>,
    /// Digest returned by hashing an extension-payload transaction.
    pub extension_digest: Option<H256>,
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder over [`TransactionSkeleton`].
///
/// ```rust,no_run
/// use ledger_tx::crypto::KeyPair;
/// use ledger_tx::transaction::TransactionBuilder;
///
/// let key = KeyPair::generate();
/// let tx = TransactionBuilder::new()
///     .to("0x3535353535353535353535353535353535353535".parse().unwrap())
///     .nonce(9)
///     .gas_price(20_000_000_000u64)
///     .gas(21_000)
///     .value(1_000_000_000_000_000_000u64)
///     .chain_id(1)
///     .sign(&key)
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    skeleton: TransactionSkeleton,
}

impl TransactionBuilder {
    /// Empty builder. With no recipient set it produces a contract creation.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, recipient: Address) -> Self {
        self.skeleton.to = Some(recipient);
        self
    }

    /// Mark as contract creation, dropping any recipient.
    pub fn create(mut self) -> Self {
        self.skeleton.creation = true;
        self.skeleton.to = None;
        self
    }

    pub fn nonce(mut self, nonce: impl Into<U256>) -> Self {
        self.skeleton.nonce = nonce.into();
        self
    }

    pub fn gas_price(mut self, gas_price: impl Into<U256>) -> Self {
        self.skeleton.gas_price = gas_price.into();
        self
    }

    pub fn gas(mut self, gas: impl Into<U256>) -> Self {
        self.skeleton.gas = gas.into();
        self
    }

    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.skeleton.value = value.into();
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.skeleton.data = data;
        self
    }

    /// Bind the signature to `chain_id`.
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.skeleton.chain_id = Some(chain_id);
        self
    }

    /// Produce an extension-payload transaction whose hash is `digest`.
    pub fn extension_digest(mut self, digest: H256) -> Self {
        self.skeleton.extension = true;
        self.skeleton.extension_digest = Some(digest);
        self
    }

    /// Produce an extension-payload transaction without a preset digest.
    pub fn extension(mut self) -> Self {
        self.skeleton.extension = true;
        self
    }

    pub fn skeleton(&self) -> &TransactionSkeleton {
        &self.skeleton
    }

    pub fn into_skeleton(self) -> TransactionSkeleton {
        self.skeleton
    }

    /// Unsigned transaction (zero signature if a chain id was set).
    pub fn build(self) -> Result<Transaction, TransactionError> {
        Transaction::from_skeleton(self.skeleton, None)
    }

    /// Signed transaction.
    pub fn sign(self, keypair: &KeyPair) -> Result<Transaction, TransactionError> {
        Transaction::from_skeleton(self.skeleton, Some(keypair))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::MAX_ADDRESS;

    fn recipient() -> Address {
        Address::repeat_byte(0x35)
    }

    #[test]
    fn kind_follows_recipient() {
        let call = TransactionBuilder::new().to(recipient()).build().unwrap();
        assert_eq!(call.kind(), TransactionKind::MessageCall);
        assert_eq!(call.recipient(), Some(recipient()));

        let create = TransactionBuilder::new().build().unwrap();
        assert_eq!(create.kind(), TransactionKind::ContractCreation);
        assert!(create.is_creation());
        assert_eq!(create.recipient(), None);
    }

    #[test]
    fn creation_flag_drops_recipient() {
        let tx = TransactionBuilder::new()
            .to(recipient())
            .create()
            .build()
            .unwrap();
        assert_eq!(tx.kind(), TransactionKind::ContractCreation);
        assert_eq!(tx.recipient(), None);
    }

    #[test]
    fn extension_kind_keeps_digest() {
        let digest = H256::repeat_byte(0xab);
        let tx = TransactionBuilder::new()
            .to(recipient())
            .extension_digest(digest)
            .build()
            .unwrap();
        assert_eq!(tx.kind(), TransactionKind::ExtensionPayload);
        assert_eq!(tx.extension_digest(), Some(digest));
    }

    #[test]
    fn extension_flag_wins_over_creation() {
        let skeleton = TransactionSkeleton {
            creation: true,
            extension: true,
            to: Some(recipient()),
            extension_digest: Some(H256::repeat_byte(0xab)),
            ..Default::default()
        };
        let tx = Transaction::from_skeleton(skeleton, None).unwrap();
        assert_eq!(tx.kind(), TransactionKind::ExtensionPayload);
        assert_eq!(tx.recipient(), Some(recipient()));
        assert_eq!(tx.extension_digest(), Some(H256::repeat_byte(0xab)));
    }

    #[test]
    fn extension_requires_recipient() {
        let result = TransactionBuilder::new()
            .extension_digest(H256::repeat_byte(0xab))
            .build();
        assert!(matches!(result, Err(TransactionError::InvalidFormat { .. })));
    }

    #[test]
    fn digest_ignored_for_plain_calls() {
        let skeleton = TransactionSkeleton {
            to: Some(recipient()),
            extension_digest: Some(H256::repeat_byte(1)),
            ..Default::default()
        };
        let tx = Transaction::from_skeleton(skeleton, None).unwrap();
        assert_eq!(tx.extension_digest(), None);
    }

    #[test]
    fn unsigned_without_chain_id() {
        let tx = TransactionBuilder::new().to(recipient()).build().unwrap();
        assert!(!tx.has_signature());
        assert_eq!(tx.chain_id(), LEGACY_CHAIN_ID);
        assert!(!tx.is_replay_protected());
        assert_eq!(tx.sender(), Err(TransactionError::Unsigned));
    }

    #[test]
    fn chain_id_without_key_gets_zero_signature() {
        let tx = TransactionBuilder::new()
            .to(recipient())
            .chain_id(4)
            .build()
            .unwrap();
        assert!(tx.has_zero_signature());
        assert_eq!(tx.chain_id(), 4);
        assert_eq!(tx.sender().unwrap(), MAX_ADDRESS);
    }

    #[test]
    fn chain_id_out_of_range_rejected() {
        let result = TransactionBuilder::new().chain_id(u64::MAX).build();
        assert!(matches!(result, Err(TransactionError::InvalidFormat { .. })));
    }

    #[test]
    fn signing_caches_sender() {
        let key = KeyPair::generate();
        let tx = TransactionBuilder::new()
            .to(recipient())
            .gas(21_000u64)
            .sign(&key)
            .unwrap();
        assert!(tx.has_signature());
        assert!(!tx.has_zero_signature());
        assert_eq!(tx.sender.get(), Some(&key.address()));
    }

    #[test]
    fn equality_ignores_caches() {
        let key = KeyPair::generate();
        let tx = TransactionBuilder::new()
            .to(recipient())
            .chain_id(1)
            .sign(&key)
            .unwrap();
        let mut cold = tx.clone();
        cold.sender = OnceCell::new();
        cold.hash = OnceCell::new();
        let _ = tx.hash();
        assert_eq!(tx, cold);
    }

    #[test]
    fn default_is_empty() {
        let tx = Transaction::default();
        assert_eq!(tx.kind(), TransactionKind::Empty);
        assert_eq!(tx.chain_id(), LEGACY_CHAIN_ID);
    }
}
