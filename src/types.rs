//! Ledger entities and snapshot types
//!
//! Everything here is a plain value: queries hand out deep copies of
//! these, never live references into the ledgers.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tokens::TokenSymbol;

/// A single free-balance entry: (token, unencumbered amount).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub symbol: TokenSymbol,
    pub amount: Decimal,
}

/// An open collateralized debt position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdpPosition {
    pub id: String,
    pub collateral_token: TokenSymbol,
    pub collateral_amount: Decimal,
    /// Debt in stablecoin (feUSD) units.
    pub debt_amount: Decimal,
    /// Loan-to-value, as a percentage.
    pub ltv: Decimal,
    pub liquidation_price: Decimal,
    pub health_factor: Decimal,
}

/// Per-token lending pool aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingPool {
    pub token: TokenSymbol,
    pub total_supplied: Decimal,
    pub total_borrowed: Decimal,
    /// Informational rates; drift on refresh, floored.
    pub supply_apy: f64,
    pub borrow_apy: f64,
    /// Borrowed share of supplied funds, as a percentage. Recomputed on
    /// every pool mutation.
    pub utilization: f64,
}

impl LendingPool {
    pub(crate) fn recompute_utilization(&mut self) {
        self.utilization = if self.total_supplied.is_zero() {
            0.0
        } else {
            (self.total_borrowed / self.total_supplied * Decimal::ONE_HUNDRED)
                .to_f64()
                .unwrap_or(0.0)
        };
    }
}

/// The user's per-token lending position. Created lazily on first supply
/// and kept as a zero record thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLendingPosition {
    pub token: TokenSymbol,
    pub supplied_amount: Decimal,
    pub borrowed_amount: Decimal,
}

/// Stability pool aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityPoolData {
    pub total_deposited: Decimal,
    pub apr: f64,
}

/// The user's stability pool deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStabilityDeposit {
    pub deposited_amount: Decimal,
    /// Monotone non-decreasing; there is no claim operation.
    pub claimable_yield: Decimal,
}

/// A full, timestamped copy of every ledger, as broadcast by the refresh
/// task and returned by `LedgerEngine::snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub taken_at: DateTime<Utc>,
    pub balances: Vec<Balance>,
    pub cdp_positions: Vec<CdpPosition>,
    pub lending_pools: Vec<LendingPool>,
    pub stability_pool: StabilityPoolData,
    pub user_lending_positions: Vec<UserLendingPosition>,
    pub user_stability_deposit: UserStabilityDeposit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn utilization_tracks_pool_totals() {
        let mut pool = LendingPool {
            token: TokenSymbol::Usdc,
            total_supplied: dec!(12000000),
            total_borrowed: dec!(9000000),
            supply_apy: 5.1,
            borrow_apy: 7.0,
            utilization: 0.0,
        };
        pool.recompute_utilization();
        assert!((pool.utilization - 75.0).abs() < 1e-9);

        pool.total_supplied = Decimal::ZERO;
        pool.total_borrowed = Decimal::ZERO;
        pool.recompute_utilization();
        assert_eq!(pool.utilization, 0.0);
    }
}
