//! Intrinsic gas: what a transaction costs before any code runs.

use ethereum_types::U256;

use super::builder::Transaction;
use super::error::TransactionError;
use crate::config::GasSchedule;

/// Base cost plus a per-byte cost for `data`, zero bytes charged less than
/// non-zero ones.
pub fn base_gas_required(is_creation: bool, data: &[u8], schedule: &GasSchedule) -> u64 {
    let base = if is_creation {
        schedule.tx_create_gas
    } else {
        schedule.tx_gas
    };
    data.iter().fold(base, |total, byte| {
        total.saturating_add(if *byte == 0 {
            schedule.tx_data_zero_gas
        } else {
            schedule.tx_data_non_zero_gas
        })
    })
}

impl Transaction {
    /// Intrinsic gas of this transaction under `schedule`.
    pub fn gas_required(&self, schedule: &GasSchedule) -> u64 {
        base_gas_required(self.is_creation(), &self.data, schedule)
    }

    /// Fail with [`TransactionError::OutOfGasIntrinsic`] if the declared gas
    /// limit is below the intrinsic cost.
    pub fn check_intrinsic_gas(&self, schedule: &GasSchedule) -> Result<(), TransactionError> {
        let required = self.gas_required(schedule);
        if self.gas < U256::from(required) {
            return Err(TransactionError::OutOfGasIntrinsic {
                required,
                provided: self.gas,
            });
        }
        Ok(())
    }
}
