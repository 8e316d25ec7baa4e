//! The combined ledger store and its transactional operations
//!
//! `LedgerState` owns every sub-ledger plus the oracle. Each operation
//! runs in two phases: compute and validate everything first, then apply
//! every mutation. A validation failure therefore leaves the whole store
//! untouched.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::balances::BalanceLedger;
use crate::cdp::{self, CdpLedger};
use crate::error::{LedgerError, Result};
use crate::lending::LendingLedger;
use crate::oracle::PriceOracle;
use crate::refresh::ApyPerturbation;
use crate::stability::StabilityLedger;
use crate::tokens::{TokenSymbol, STABLECOIN};
use crate::types::{
    Balance, CdpPosition, LedgerSnapshot, LendingPool, StabilityPoolData, UserLendingPosition,
    UserStabilityDeposit,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerState {
    balances: BalanceLedger,
    cdps: CdpLedger,
    lending: LendingLedger,
    stability: StabilityLedger,
    oracle: PriceOracle,
}

impl LedgerState {
    /// Empty store over the default oracle.
    pub fn new() -> Self {
        Self {
            balances: BalanceLedger::new(),
            cdps: CdpLedger::new(),
            lending: LendingLedger::new(),
            stability: StabilityLedger::new(),
            oracle: PriceOracle::new(),
        }
    }

    /// Store seeded with the demo session data.
    pub fn seeded() -> Self {
        Self {
            balances: BalanceLedger::seeded(),
            cdps: CdpLedger::seeded(),
            lending: LendingLedger::seeded(),
            stability: StabilityLedger::seeded(),
            oracle: PriceOracle::new(),
        }
    }

    pub fn oracle(&self) -> &PriceOracle {
        &self.oracle
    }

    /// Credit a free balance directly. Session setup only; every other
    /// balance movement goes through an operation below.
    pub fn fund(&mut self, token: TokenSymbol, amount: Decimal) -> Result<()> {
        self.balances.credit(token, amount)
    }

    // --- Mutating operations ---

    /// Lock collateral and mint stablecoin against it.
    pub fn open_cdp(
        &mut self,
        collateral_token: TokenSymbol,
        collateral_amount: Decimal,
        mint_amount: Decimal,
    ) -> Result<CdpPosition> {
        ensure_positive(collateral_amount)?;
        ensure_positive(mint_amount)?;
        let collateral_price = self.oracle.price(collateral_token)?;
        let stablecoin_price = self.oracle.price(STABLECOIN)?;
        let quote = cdp::quote(
            collateral_amount,
            collateral_price,
            mint_amount,
            stablecoin_price,
        )?;
        self.balances
            .ensure_available(collateral_token, collateral_amount)?;

        self.balances.debit(collateral_token, collateral_amount)?;
        self.balances.credit(STABLECOIN, mint_amount)?;
        Ok(self
            .cdps
            .append(collateral_token, collateral_amount, mint_amount, &quote))
    }

    /// Move free balance into the lending pool.
    pub fn supply(&mut self, token: TokenSymbol, amount: Decimal) -> Result<()> {
        ensure_positive(amount)?;
        self.balances.debit(token, amount)?;
        self.lending.commit_supply(token, amount);
        Ok(())
    }

    /// Pull supplied funds back out, as long as remaining collateral still
    /// covers the outstanding borrow.
    pub fn withdraw(&mut self, token: TokenSymbol, amount: Decimal) -> Result<()> {
        ensure_positive(amount)?;
        let price = self.oracle.price(token)?;
        self.lending.check_withdraw(token, amount, price)?;

        self.lending.commit_withdraw(token, amount);
        self.balances.credit(token, amount)?;
        Ok(())
    }

    /// Borrow against supplied collateral in the same token.
    pub fn borrow(&mut self, token: TokenSymbol, amount: Decimal) -> Result<()> {
        ensure_positive(amount)?;
        let price = self.oracle.price(token)?;
        self.lending.check_borrow(token, amount, price)?;

        self.balances.credit(token, amount)?;
        self.lending.commit_borrow(token, amount);
        Ok(())
    }

    /// Repay outstanding borrow. Overpayment is capped at the outstanding
    /// debt; the capped amount actually debited is returned.
    pub fn repay(&mut self, token: TokenSymbol, amount: Decimal) -> Result<Decimal> {
        ensure_positive(amount)?;
        self.balances.ensure_available(token, amount)?;
        let outstanding = self.lending.outstanding_debt(token)?;
        let actual = amount.min(outstanding);

        self.balances.debit(token, actual)?;
        self.lending.commit_repay(token, actual);
        Ok(actual)
    }

    /// Move stablecoin balance into the stability pool.
    pub fn deposit_stability(&mut self, amount: Decimal) -> Result<()> {
        ensure_positive(amount)?;
        self.balances.debit(STABLECOIN, amount)?;
        self.stability.commit_deposit(amount);
        Ok(())
    }

    /// Pull stablecoin back out of the stability pool.
    pub fn withdraw_stability(&mut self, amount: Decimal) -> Result<()> {
        ensure_positive(amount)?;
        self.stability.check_withdraw(amount)?;

        self.stability.commit_withdraw(amount);
        self.balances.credit(STABLECOIN, amount)?;
        Ok(())
    }

    /// Apply one APY drift step to every lending pool. Touches no
    /// balances or position amounts.
    pub fn perturb_apys(&mut self, perturbation: &mut dyn ApyPerturbation) {
        self.lending.apply_apy_drift(perturbation);
    }

    // --- Projections (deep copies, never live references) ---

    pub fn balances(&self) -> Vec<Balance> {
        self.balances.list()
    }

    pub fn balance_of(&self, token: TokenSymbol) -> Decimal {
        self.balances.get(token)
    }

    pub fn cdp_positions(&self) -> Vec<CdpPosition> {
        self.cdps.list()
    }

    pub fn lending_pools(&self) -> Vec<LendingPool> {
        self.lending.pools()
    }

    pub fn user_lending_positions(&self) -> Vec<UserLendingPosition> {
        self.lending.user_positions()
    }

    pub fn user_lending_position(&self, token: TokenSymbol) -> Option<UserLendingPosition> {
        self.lending.position(token).cloned()
    }

    pub fn stability_pool(&self) -> StabilityPoolData {
        self.stability.pool()
    }

    pub fn user_stability_deposit(&self) -> UserStabilityDeposit {
        self.stability.user_deposit()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            taken_at: Utc::now(),
            balances: self.balances(),
            cdp_positions: self.cdp_positions(),
            lending_pools: self.lending_pools(),
            stability_pool: self.stability_pool(),
            user_lending_positions: self.user_lending_positions(),
            user_stability_deposit: self.user_stability_deposit(),
        }
    }
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(())
}
