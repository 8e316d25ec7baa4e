//! Accounting facade: the single operation surface over the ledgers
//!
//! All mutating operations are serialized through one write lock, so at
//! most one is in flight against the shared ledgers at a time. Queries
//! take read locks and hand back deep copies.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::error::{LedgerError, Result};
use crate::refresh::ApyPerturbation;
use crate::state::LedgerState;
use crate::tokens::TokenSymbol;
use crate::types::{
    Balance, CdpPosition, LedgerSnapshot, LendingPool, StabilityPoolData, UserLendingPosition,
    UserStabilityDeposit,
};

/// Shared handle to the ledger store. Cheap to clone.
#[derive(Clone)]
pub struct LedgerEngine {
    state: Arc<RwLock<LedgerState>>,
    config: EngineConfig,
}

impl LedgerEngine {
    /// Engine over the demo session data with the given configuration.
    pub fn seeded(config: EngineConfig) -> Self {
        Self::with_state(LedgerState::seeded(), config)
    }

    /// Engine over an explicit store.
    pub fn with_state(state: LedgerState, config: EngineConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            config,
        }
    }

    // --- Mutating operations ---

    /// Lock collateral, mint stablecoin, and open a new CDP.
    pub async fn open_cdp(
        &self,
        collateral_token: TokenSymbol,
        collateral_amount: Decimal,
        mint_amount: Decimal,
    ) -> Result<CdpPosition> {
        self.execute("open_cdp", move |state| {
            state.open_cdp(collateral_token, collateral_amount, mint_amount)
        })
        .await
    }

    /// Supply to the lending pool.
    pub async fn supply(&self, token: TokenSymbol, amount: Decimal) -> Result<()> {
        self.execute("supply", move |state| state.supply(token, amount))
            .await
    }

    /// Withdraw supplied funds from the lending pool.
    pub async fn withdraw(&self, token: TokenSymbol, amount: Decimal) -> Result<()> {
        self.execute("withdraw", move |state| state.withdraw(token, amount))
            .await
    }

    /// Borrow against supplied collateral.
    pub async fn borrow(&self, token: TokenSymbol, amount: Decimal) -> Result<()> {
        self.execute("borrow", move |state| state.borrow(token, amount))
            .await
    }

    /// Repay outstanding borrow; returns the capped amount debited.
    pub async fn repay(&self, token: TokenSymbol, amount: Decimal) -> Result<Decimal> {
        self.execute("repay", move |state| state.repay(token, amount))
            .await
    }

    /// Deposit stablecoin into the stability pool.
    pub async fn deposit_stability(&self, amount: Decimal) -> Result<()> {
        self.execute("deposit_stability", move |state| {
            state.deposit_stability(amount)
        })
        .await
    }

    /// Withdraw stablecoin from the stability pool.
    pub async fn withdraw_stability(&self, amount: Decimal) -> Result<()> {
        self.execute("withdraw_stability", move |state| {
            state.withdraw_stability(amount)
        })
        .await
    }

    /// One refresh pass: drift APYs under the write lock, then return a
    /// fresh snapshot. Used by the background refresh task.
    pub async fn refresh(&self, perturbation: &mut dyn ApyPerturbation) -> Result<LedgerSnapshot> {
        let mut state = self.state.write().await;
        state.perturb_apys(perturbation);
        Ok(state.snapshot())
    }

    // --- Queries (read lock, deep copies) ---

    pub async fn balances(&self) -> Vec<Balance> {
        self.state.read().await.balances()
    }

    pub async fn balance_of(&self, token: TokenSymbol) -> Decimal {
        self.state.read().await.balance_of(token)
    }

    pub async fn cdp_positions(&self) -> Vec<CdpPosition> {
        self.state.read().await.cdp_positions()
    }

    pub async fn lending_pools(&self) -> Vec<LendingPool> {
        self.state.read().await.lending_pools()
    }

    pub async fn user_lending_positions(&self) -> Vec<UserLendingPosition> {
        self.state.read().await.user_lending_positions()
    }

    pub async fn stability_pool(&self) -> StabilityPoolData {
        self.state.read().await.stability_pool()
    }

    pub async fn user_stability_deposit(&self) -> UserStabilityDeposit {
        self.state.read().await.user_stability_deposit()
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().await.snapshot()
    }

    // --- Internals ---

    /// Run one mutating operation: simulated latency, then the
    /// validate-and-commit section under the write lock, all bounded by
    /// the operation timeout. The commit itself is synchronous, so a
    /// timeout can never observe a partial write.
    async fn execute<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut LedgerState) -> Result<T>,
    {
        let op_timeout = Duration::from_millis(self.config.op_timeout_ms);
        let result = timeout(op_timeout, async {
            self.simulate_latency().await;
            let mut state = self.state.write().await;
            f(&mut state)
        })
        .await;

        match result {
            Ok(Ok(value)) => {
                info!(operation, "ledger operation committed");
                Ok(value)
            }
            Ok(Err(e)) => {
                if e.is_validation() {
                    warn!(operation, code = e.code(), error = %e, "ledger operation rejected");
                } else {
                    error!(operation, code = e.code(), error = %e, "ledger operation failed");
                }
                Err(e)
            }
            Err(_) => {
                let timeout_ms = self.config.op_timeout_ms;
                warn!(operation, timeout_ms, "ledger operation timed out");
                Err(LedgerError::Timeout { timeout_ms })
            }
        }
    }

    /// Emulate network/transaction latency, as the reference does.
    async fn simulate_latency(&self) {
        if let Some((min_ms, max_ms)) = self.config.latency_range() {
            let ms = {
                use rand::Rng;
                rand::thread_rng().gen_range(min_ms..=max_ms)
            };
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}
