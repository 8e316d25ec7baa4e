//! Stability pool ledger: aggregate stablecoin deposits and the user's
//! share
//!
//! Deposits are not used as borrow collateral anywhere else, so the only
//! check on withdrawal is against the user's own deposit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{LedgerError, Result};
use crate::types::{StabilityPoolData, UserStabilityDeposit};

#[derive(Debug, Clone, PartialEq)]
pub struct StabilityLedger {
    pool: StabilityPoolData,
    user: UserStabilityDeposit,
}

impl StabilityLedger {
    pub fn new() -> Self {
        Self {
            pool: StabilityPoolData {
                total_deposited: Decimal::ZERO,
                apr: 0.0,
            },
            user: UserStabilityDeposit {
                deposited_amount: Decimal::ZERO,
                claimable_yield: Decimal::ZERO,
            },
        }
    }

    /// Ledger seeded with the demo pool and deposit.
    pub fn seeded() -> Self {
        Self {
            pool: StabilityPoolData {
                total_deposited: dec!(10000000),
                apr: 12.5,
            },
            user: UserStabilityDeposit {
                deposited_amount: dec!(5000),
                claimable_yield: dec!(125.34),
            },
        }
    }

    /// Validate a withdrawal against the user's deposit. Read-only.
    pub fn check_withdraw(&self, amount: Decimal) -> Result<()> {
        if self.user.deposited_amount < amount {
            return Err(LedgerError::ExceedsDeposit {
                requested: amount,
                deposited: self.user.deposited_amount,
            });
        }
        Ok(())
    }

    /// Commit a deposit. Infallible; the stablecoin balance check happens
    /// before.
    pub fn commit_deposit(&mut self, amount: Decimal) {
        self.user.deposited_amount += amount;
        self.pool.total_deposited += amount;
    }

    /// Commit a withdrawal already validated by `check_withdraw`.
    pub fn commit_withdraw(&mut self, amount: Decimal) {
        self.user.deposited_amount -= amount;
        self.pool.total_deposited -= amount;
    }

    pub fn pool(&self) -> StabilityPoolData {
        self.pool.clone()
    }

    pub fn user_deposit(&self) -> UserStabilityDeposit {
        self.user.clone()
    }
}

impl Default for StabilityLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_and_withdraw_move_both_aggregates() {
        let mut ledger = StabilityLedger::seeded();
        ledger.commit_deposit(dec!(500));
        assert_eq!(ledger.user_deposit().deposited_amount, dec!(5500));
        assert_eq!(ledger.pool().total_deposited, dec!(10000500));

        ledger.check_withdraw(dec!(5500)).unwrap();
        ledger.commit_withdraw(dec!(5500));
        assert_eq!(ledger.user_deposit().deposited_amount, Decimal::ZERO);
        assert_eq!(ledger.pool().total_deposited, dec!(9995000));
    }

    #[test]
    fn withdraw_over_deposit_is_rejected() {
        let ledger = StabilityLedger::seeded();
        let err = ledger.check_withdraw(dec!(5001)).unwrap_err();
        match err {
            LedgerError::ExceedsDeposit {
                requested,
                deposited,
            } => {
                assert_eq!(requested, dec!(5001));
                assert_eq!(deposited, dec!(5000));
            }
            other => panic!("expected ExceedsDeposit, got {other:?}"),
        }
    }

    #[test]
    fn yield_is_untouched_by_deposits() {
        let mut ledger = StabilityLedger::seeded();
        let before = ledger.user_deposit().claimable_yield;
        ledger.commit_deposit(dec!(100));
        ledger.commit_withdraw(dec!(100));
        assert_eq!(ledger.user_deposit().claimable_yield, before);
    }
}
