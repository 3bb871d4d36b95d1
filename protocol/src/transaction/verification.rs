//! Admission checks for decoded transactions.
//!
//! [`verify_transaction`] applies a [`ValidationPolicy`] on top of what the
//! codec already guarantees. Checks are ordered from cheapest to most
//! expensive so that obviously bad transactions never reach public-key
//! recovery.

use ethereum_types::Address;
use tracing::{debug, trace};

use super::builder::Transaction;
use super::error::TransactionError;
use super::types::TransactionKind;
use crate::config::ValidationPolicy;

/// Verify `tx` against `policy` and return its sender.
///
/// # Checks (in order)
///
/// 1. **Not empty**: an `Empty` transaction is never admissible.
/// 2. **Signed**: a signature (or the zero placeholder) must be present.
/// 3. **Zero signature**: only if the policy allows it.
/// 4. **Signature shape**: `r`, `s` in `[1, n)` and recovery id 0/1.
/// 5. **Chain id**: bound to `policy.chain_id`, or legacy if allowed.
/// 6. **Low S**: if the policy requires it.
/// 7. **Intrinsic gas**: declared gas covers the intrinsic cost.
/// 8. **Sender**: public-key recovery succeeds.
///
/// # Errors
///
/// The first failing check, as a [`TransactionError`].
pub fn verify_transaction(
    tx: &Transaction,
    policy: &ValidationPolicy,
) -> Result<Address, TransactionError> {
    // 1. Empty placeholders are never sent.
    if tx.kind() == TransactionKind::Empty {
        return Err(TransactionError::InvalidFormat {
            reason: "empty transaction",
        });
    }

    // 2. Signature presence.
    let signature = tx.signature().ok_or(TransactionError::Unsigned)?;

    // 3-4. Zero placeholder or a well-formed signature.
    if signature.is_zero() {
        if !policy.allow_zero_signature {
            return Err(TransactionError::InvalidSignature);
        }
    } else if !signature.is_valid() {
        return Err(TransactionError::InvalidSignature);
    }

    // 5. Replay protection.
    tx.check_chain_id(policy.chain_id)?;
    if !policy.allow_legacy_signatures && !tx.is_replay_protected() {
        return Err(TransactionError::InvalidSignature);
    }

    // 6. Malleability.
    if policy.require_low_s {
        tx.check_low_s()?;
    }

    // 7. Intrinsic gas.
    tx.check_intrinsic_gas(&policy.schedule)?;

    // 8. Recovery last, it is by far the most expensive step.
    let sender = tx.sender().map_err(|err| {
        debug!(error = %err, "sender recovery failed during verification");
        err
    })?;

    trace!(sender = ?sender, chain_id = tx.chain_id(), "transaction verified");
    Ok(sender)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GasSchedule, SECP256K1_N};
    use crate::crypto::{KeyPair, SignatureStruct};
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::types::{CheckTransaction, MAX_ADDRESS};

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new()
            .to(Address::repeat_byte(0x35))
            .nonce(1u64)
            .gas(21_000u64)
            .gas_price(1u64)
            .value(10u64)
    }

    fn roundtrip(tx: &Transaction) -> Transaction {
        Transaction::decode(&tx.encode().unwrap(), CheckTransaction::None).unwrap()
    }

    #[test]
    fn valid_transaction_passes() {
        let key = KeyPair::generate();
        let tx = roundtrip(&builder().chain_id(1).sign(&key).unwrap());
        assert_eq!(
            verify_transaction(&tx, &ValidationPolicy::for_chain(1)).unwrap(),
            key.address()
        );
    }

    #[test]
    fn rejects_empty() {
        let result = verify_transaction(&Transaction::default(), &ValidationPolicy::default());
        match result {
            Err(TransactionError::InvalidFormat { .. }) => {}
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn rejects_unsigned() {
        let tx = builder().build().unwrap();
        assert_eq!(
            verify_transaction(&tx, &ValidationPolicy::default()),
            Err(TransactionError::Unsigned)
        );
    }

    #[test]
    fn zero_signature_needs_policy() {
        let tx = builder().chain_id(1).build().unwrap();
        let mut policy = ValidationPolicy::for_chain(1);
        assert_eq!(
            verify_transaction(&tx, &policy),
            Err(TransactionError::InvalidSignature)
        );

        policy.allow_zero_signature = true;
        assert_eq!(verify_transaction(&tx, &policy).unwrap(), MAX_ADDRESS);
    }

    #[test]
    fn rejects_wrong_chain() {
        let key = KeyPair::generate();
        let tx = builder().chain_id(3).sign(&key).unwrap();
        assert_eq!(
            verify_transaction(&tx, &ValidationPolicy::for_chain(1)),
            Err(TransactionError::InvalidSignature)
        );
    }

    #[test]
    fn legacy_signatures_follow_policy() {
        let key = KeyPair::generate();
        let tx = roundtrip(&builder().sign(&key).unwrap());

        let mut policy = ValidationPolicy::for_chain(17);
        assert_eq!(verify_transaction(&tx, &policy).unwrap(), key.address());

        policy.allow_legacy_signatures = false;
        assert_eq!(
            verify_transaction(&tx, &policy),
            Err(TransactionError::InvalidSignature)
        );
    }

    #[test]
    fn high_s_follows_policy() {
        let key = KeyPair::generate();
        let mut tx = roundtrip(&builder().chain_id(1).sign(&key).unwrap());
        let sig = tx.signature.unwrap();
        tx.signature = Some(SignatureStruct::new(sig.r, SECP256K1_N - sig.s, sig.v ^ 1));

        let mut policy = ValidationPolicy::for_chain(1);
        assert_eq!(
            verify_transaction(&tx, &policy),
            Err(TransactionError::InvalidSignature)
        );

        policy.require_low_s = false;
        assert_eq!(verify_transaction(&tx, &policy).unwrap(), key.address());
    }

    #[test]
    fn rejects_insufficient_gas() {
        let key = KeyPair::generate();
        let tx = builder().gas(20_999u64).chain_id(1).sign(&key).unwrap();
        match verify_transaction(&tx, &ValidationPolicy::for_chain(1)) {
            Err(TransactionError::OutOfGasIntrinsic { required, .. }) => {
                assert_eq!(required, 21_000)
            }
            other => panic!("expected OutOfGasIntrinsic, got {:?}", other),
        }
    }

    #[test]
    fn schedule_comes_from_policy() {
        let key = KeyPair::generate();
        let tx = TransactionBuilder::new()
            .create()
            .gas(21_000u64)
            .chain_id(1)
            .sign(&key)
            .unwrap();

        let mut policy = ValidationPolicy::for_chain(1);
        assert!(verify_transaction(&tx, &policy).is_err());

        policy.schedule = GasSchedule::frontier();
        assert!(verify_transaction(&tx, &policy).is_ok());
    }

    #[test]
    fn rejects_out_of_range_signature() {
        let key = KeyPair::generate();
        let mut tx = roundtrip(&builder().chain_id(1).sign(&key).unwrap());
        let sig = tx.signature.unwrap();
        tx.signature = Some(SignatureStruct::new(SECP256K1_N, sig.s, sig.v));
        assert_eq!(
            verify_transaction(&tx, &ValidationPolicy::for_chain(1)),
            Err(TransactionError::InvalidSignature)
        );
    }
}
