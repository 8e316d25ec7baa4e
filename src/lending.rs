//! Lending pool ledger: per-token pool aggregates and the user's
//! supplied/borrowed positions
//!
//! Collateral and debt are priced in the same token here (no cross-token
//! collateralization); the 0.8 borrow factor is shared by the borrow and
//! withdraw checks.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::error::{LedgerError, Result};
use crate::refresh::ApyPerturbation;
use crate::tokens::TokenSymbol;
use crate::types::{LendingPool, UserLendingPosition};

/// Maximum fraction of supplied collateral value that may be borrowed.
pub const BORROW_FACTOR: Decimal = dec!(0.8);

/// Lower clamp for drifting supply APYs.
pub const SUPPLY_APY_FLOOR: f64 = 0.5;

/// Lower clamp for drifting borrow APYs.
pub const BORROW_APY_FLOOR: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LendingLedger {
    pools: BTreeMap<TokenSymbol, LendingPool>,
    positions: BTreeMap<TokenSymbol, UserLendingPosition>,
}

impl LendingLedger {
    pub fn new() -> Self {
        Self {
            pools: BTreeMap::new(),
            positions: BTreeMap::new(),
        }
    }

    /// Ledger seeded with the demo pools and user positions.
    pub fn seeded() -> Self {
        let mut ledger = Self::new();
        for (token, supplied, borrowed, supply_apy, borrow_apy) in [
            (TokenSymbol::Husd, dec!(5000000), dec!(3500000), 4.5, 6.2),
            (TokenSymbol::Usdc, dec!(12000000), dec!(9000000), 5.1, 7.0),
            (TokenSymbol::FeUsd, dec!(8000000), dec!(4000000), 3.8, 5.5),
            (TokenSymbol::Wbtc, dec!(100), dec!(40), 1.5, 2.8),
        ] {
            let mut pool = LendingPool {
                token,
                total_supplied: supplied,
                total_borrowed: borrowed,
                supply_apy,
                borrow_apy,
                utilization: 0.0,
            };
            pool.recompute_utilization();
            ledger.pools.insert(token, pool);
        }
        for (token, supplied, borrowed) in [
            (TokenSymbol::Usdc, dec!(20000), dec!(5000)),
            (TokenSymbol::FeUsd, dec!(0), dec!(1000)),
            (TokenSymbol::Wbtc, dec!(0.1), dec!(0)),
            (TokenSymbol::Husd, dec!(0), dec!(0)),
        ] {
            ledger.positions.insert(
                token,
                UserLendingPosition {
                    token,
                    supplied_amount: supplied,
                    borrowed_amount: borrowed,
                },
            );
        }
        ledger
    }

    /// The user's position for a token, if one was ever created.
    pub fn position(&self, token: TokenSymbol) -> Option<&UserLendingPosition> {
        self.positions.get(&token)
    }

    /// Validate a withdrawal: enough supplied, and the remaining
    /// collateral still covers the outstanding debt under the borrow
    /// factor. Read-only.
    pub fn check_withdraw(
        &self,
        token: TokenSymbol,
        amount: Decimal,
        price: Decimal,
    ) -> Result<()> {
        let (supplied, borrowed) = match self.positions.get(&token) {
            Some(p) => (p.supplied_amount, p.borrowed_amount),
            None => (Decimal::ZERO, Decimal::ZERO),
        };
        if supplied < amount {
            return Err(LedgerError::InsufficientSupplied {
                token,
                requested: amount,
                supplied,
            });
        }
        let remaining_collateral_value = (supplied - amount) * price;
        let borrowed_value = borrowed * price;
        if borrowed_value > remaining_collateral_value * BORROW_FACTOR {
            return Err(LedgerError::BorrowLimitExceeded {
                token,
                debt_value: borrowed_value,
                limit_value: remaining_collateral_value * BORROW_FACTOR,
            });
        }
        Ok(())
    }

    /// Validate a borrow against the supplied-collateral limit. Read-only.
    pub fn check_borrow(
        &self,
        token: TokenSymbol,
        amount: Decimal,
        price: Decimal,
    ) -> Result<()> {
        let position = self
            .positions
            .get(&token)
            .ok_or(LedgerError::MustSupplyFirst { token })?;
        let collateral_value = position.supplied_amount * price;
        let new_borrowed_value = (position.borrowed_amount + amount) * price;
        let limit_value = collateral_value * BORROW_FACTOR;
        if new_borrowed_value > limit_value {
            return Err(LedgerError::BorrowLimitExceeded {
                token,
                debt_value: new_borrowed_value,
                limit_value,
            });
        }
        Ok(())
    }

    /// Outstanding debt for a token; fails when there is nothing to repay.
    pub fn outstanding_debt(&self, token: TokenSymbol) -> Result<Decimal> {
        let borrowed = self
            .positions
            .get(&token)
            .map(|p| p.borrowed_amount)
            .unwrap_or(Decimal::ZERO);
        if borrowed <= Decimal::ZERO {
            return Err(LedgerError::NoOutstandingDebt { token });
        }
        Ok(borrowed)
    }

    /// Commit a supply: credit the user position (created lazily) and the
    /// pool aggregate. Infallible; validation happens before.
    pub fn commit_supply(&mut self, token: TokenSymbol, amount: Decimal) {
        let position = self
            .positions
            .entry(token)
            .or_insert_with(|| UserLendingPosition {
                token,
                supplied_amount: Decimal::ZERO,
                borrowed_amount: Decimal::ZERO,
            });
        position.supplied_amount += amount;
        if let Some(pool) = self.pools.get_mut(&token) {
            pool.total_supplied += amount;
            pool.recompute_utilization();
        }
    }

    /// Commit a withdrawal already validated by `check_withdraw`.
    pub fn commit_withdraw(&mut self, token: TokenSymbol, amount: Decimal) {
        if let Some(position) = self.positions.get_mut(&token) {
            position.supplied_amount -= amount;
        }
        if let Some(pool) = self.pools.get_mut(&token) {
            pool.total_supplied -= amount;
            pool.recompute_utilization();
        }
    }

    /// Commit a borrow already validated by `check_borrow`.
    pub fn commit_borrow(&mut self, token: TokenSymbol, amount: Decimal) {
        if let Some(position) = self.positions.get_mut(&token) {
            position.borrowed_amount += amount;
        }
        if let Some(pool) = self.pools.get_mut(&token) {
            pool.total_borrowed += amount;
            pool.recompute_utilization();
        }
    }

    /// Commit a repayment of `amount` (already capped at the outstanding
    /// debt).
    pub fn commit_repay(&mut self, token: TokenSymbol, amount: Decimal) {
        if let Some(position) = self.positions.get_mut(&token) {
            position.borrowed_amount -= amount;
        }
        if let Some(pool) = self.pools.get_mut(&token) {
            pool.total_borrowed -= amount;
            pool.recompute_utilization();
        }
    }

    /// Apply one APY drift step to every pool, clamped to the floors.
    /// Touches only the informational rate fields.
    pub fn apply_apy_drift(&mut self, perturbation: &mut dyn ApyPerturbation) {
        for pool in self.pools.values_mut() {
            pool.supply_apy = (pool.supply_apy + perturbation.delta()).max(SUPPLY_APY_FLOOR);
            pool.borrow_apy = (pool.borrow_apy + perturbation.delta()).max(BORROW_APY_FLOOR);
        }
    }

    /// Snapshot of all pools, in display order.
    pub fn pools(&self) -> Vec<LendingPool> {
        self.pools.values().cloned().collect()
    }

    /// Snapshot of all user positions, in display order.
    pub fn user_positions(&self) -> Vec<UserLendingPosition> {
        self.positions.values().cloned().collect()
    }
}

impl Default for LendingLedger {
    fn default() -> Self {
        Self::new()
    }
}
