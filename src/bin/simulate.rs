//! End-to-end demo run: exercises every facade operation against the
//! seeded ledger with tracing output.

use anyhow::Result;
use rust_decimal_macros::dec;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use felix_ledger::config::LedgerConfig;
use felix_ledger::engine::LedgerEngine;
use felix_ledger::intent::{self, Intent};
use felix_ledger::refresh::{RandomDrift, RefreshTask};
use felix_ledger::tokens::TokenSymbol;

#[tokio::main]
async fn main() -> Result<()> {
    let config = LedgerConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let engine = LedgerEngine::seeded(config.engine.clone());
    let refresh = RefreshTask::spawn(
        engine.clone(),
        config.refresh.interval(),
        Box::new(RandomDrift::new()),
    );

    info!("starting ledger simulation");
    for balance in engine.balances().await {
        info!(token = %balance.symbol, amount = %balance.amount, "wallet balance");
    }

    // Open a CDP: 2 ETH backing 2000 feUSD.
    let position = engine
        .open_cdp(TokenSymbol::Eth, dec!(2), dec!(2000))
        .await?;
    info!(
        id = %position.id,
        ltv = %position.ltv.round_dp(2),
        health_factor = %position.health_factor.round_dp(2),
        liquidation_price = %position.liquidation_price.round_dp(2),
        "opened CDP"
    );

    // An undercollateralized attempt is rejected without side effects.
    if let Err(e) = engine.open_cdp(TokenSymbol::Eth, dec!(1), dec!(6000)).await {
        warn!(code = e.code(), "rejected as expected: {e}");
    }

    // Lending round trip.
    engine.supply(TokenSymbol::Usdc, dec!(1000)).await?;
    engine.borrow(TokenSymbol::Usdc, dec!(800)).await?;
    let repaid = engine.repay(TokenSymbol::Usdc, dec!(10000)).await?;
    info!(%repaid, "repaid borrow (overpayment capped)");
    engine.withdraw(TokenSymbol::Usdc, dec!(1000)).await?;

    // Stability pool round trip.
    engine.deposit_stability(dec!(500)).await?;
    engine.withdraw_stability(dec!(200)).await?;

    // Free-text command dispatch.
    let text = "supply 250 USDC to the lending pool";
    match intent::parse(text) {
        Some(Intent::SupplyLending { token, amount }) => {
            engine.supply(token, amount).await?;
            info!(%token, %amount, "dispatched intent: {text:?}");
        }
        other => warn!(?other, "unexpected intent for {text:?}"),
    }

    // Let the background refresh drift the APYs once, then report.
    let mut snapshots = refresh.subscribe();
    if let Ok(snapshot) = snapshots.recv().await {
        for pool in &snapshot.lending_pools {
            info!(
                token = %pool.token,
                supply_apy = pool.supply_apy,
                borrow_apy = pool.borrow_apy,
                utilization = pool.utilization,
                "pool after refresh"
            );
        }
    }

    info!(
        cdp_positions = engine.cdp_positions().await.len(),
        stability_deposit = %engine.user_stability_deposit().await.deposited_amount,
        "simulation complete"
    );
    refresh.shutdown();
    Ok(())
}
