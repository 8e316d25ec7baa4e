//! CDP ledger: collateralized debt positions and their risk math

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::tokens::TokenSymbol;
use crate::types::CdpPosition;

/// Maximum loan-to-value ratio for CDP collateral.
pub const MAX_LTV: Decimal = dec!(0.75);

/// Safety buffer over the raw LTV cap: positions must open with a health
/// factor at or above this.
pub const MIN_HEALTH_FACTOR: Decimal = dec!(1.1);

/// Risk figures for a prospective (or just-opened) position.
#[derive(Debug, Clone, PartialEq)]
pub struct CdpQuote {
    pub collateral_value: Decimal,
    pub debt_value: Decimal,
    /// Loan-to-value, as a percentage.
    pub ltv: Decimal,
    pub health_factor: Decimal,
    pub liquidation_price: Decimal,
}

/// Compute the risk figures for opening a position, without touching any
/// ledger. Fails `InvalidAmount` for non-positive inputs and
/// `HealthFactorTooLow` below the safety buffer.
pub fn quote(
    collateral_amount: Decimal,
    collateral_price: Decimal,
    mint_amount: Decimal,
    stablecoin_price: Decimal,
) -> Result<CdpQuote> {
    if collateral_amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount {
            amount: collateral_amount,
        });
    }
    if mint_amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount {
            amount: mint_amount,
        });
    }

    let collateral_value = collateral_amount * collateral_price;
    let debt_value = mint_amount * stablecoin_price;
    let ltv = debt_value / collateral_value * Decimal::ONE_HUNDRED;
    let health_factor = collateral_value * MAX_LTV / debt_value;
    let liquidation_price = mint_amount / collateral_amount / MAX_LTV;

    if health_factor < MIN_HEALTH_FACTOR {
        return Err(LedgerError::HealthFactorTooLow {
            health_factor,
            minimum: MIN_HEALTH_FACTOR,
        });
    }

    Ok(CdpQuote {
        collateral_value,
        debt_value,
        ltv,
        health_factor,
        liquidation_price,
    })
}

/// The set of open positions. Append-only: no close, top-up, or
/// liquidation operation exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CdpLedger {
    positions: Vec<CdpPosition>,
}

impl CdpLedger {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
        }
    }

    /// Ledger seeded with the two demo positions.
    pub fn seeded() -> Self {
        Self {
            positions: vec![
                CdpPosition {
                    id: "cdp-0x123456".to_string(),
                    collateral_token: TokenSymbol::Eth,
                    collateral_amount: dec!(2.5),
                    debt_amount: dec!(2500),
                    ltv: dec!(28.57),
                    liquidation_price: dec!(1428.57),
                    health_factor: dec!(2.45),
                },
                CdpPosition {
                    id: "cdp-0xabcdef".to_string(),
                    collateral_token: TokenSymbol::Hype,
                    collateral_amount: dec!(10000),
                    debt_amount: dec!(15000),
                    ltv: dec!(33.33),
                    liquidation_price: dec!(2.00),
                    health_factor: dec!(1.85),
                },
            ],
        }
    }

    /// Append a freshly validated position built from a quote.
    pub fn append(
        &mut self,
        collateral_token: TokenSymbol,
        collateral_amount: Decimal,
        mint_amount: Decimal,
        quote: &CdpQuote,
    ) -> CdpPosition {
        let position = CdpPosition {
            id: new_position_id(),
            collateral_token,
            collateral_amount,
            debt_amount: mint_amount,
            ltv: quote.ltv,
            liquidation_price: quote.liquidation_price,
            health_factor: quote.health_factor,
        };
        self.positions.push(position.clone());
        position
    }

    /// Snapshot of all open positions.
    pub fn list(&self) -> Vec<CdpPosition> {
        self.positions.clone()
    }
}

impl Default for CdpLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn new_position_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("cdp-0x{}", &uuid[..6])
}
