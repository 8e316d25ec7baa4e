//! Token registry: the closed set of symbols every ledger keys off

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// The stablecoin minted against CDP collateral and deposited into the
/// stability pool.
pub const STABLECOIN: TokenSymbol = TokenSymbol::FeUsd;

/// Supported token symbols.
///
/// This enum is the single registry key for every ledger; unknown symbols
/// are rejected once, at parse time, instead of ad hoc per call site.
/// Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenSymbol {
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "WBTC")]
    Wbtc,
    #[serde(rename = "HYPE")]
    Hype,
    #[serde(rename = "USDC")]
    Usdc,
    #[serde(rename = "feUSD")]
    FeUsd,
    #[serde(rename = "HUSD")]
    Husd,
}

impl TokenSymbol {
    /// All registered symbols, in display order.
    pub const ALL: [TokenSymbol; 6] = [
        TokenSymbol::Eth,
        TokenSymbol::Wbtc,
        TokenSymbol::Hype,
        TokenSymbol::Usdc,
        TokenSymbol::FeUsd,
        TokenSymbol::Husd,
    ];

    /// Canonical ticker string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSymbol::Eth => "ETH",
            TokenSymbol::Wbtc => "WBTC",
            TokenSymbol::Hype => "HYPE",
            TokenSymbol::Usdc => "USDC",
            TokenSymbol::FeUsd => "feUSD",
            TokenSymbol::Husd => "HUSD",
        }
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenSymbol {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ETH" => Ok(TokenSymbol::Eth),
            "WBTC" => Ok(TokenSymbol::Wbtc),
            "HYPE" => Ok(TokenSymbol::Hype),
            "USDC" => Ok(TokenSymbol::Usdc),
            "FEUSD" => Ok(TokenSymbol::FeUsd),
            "HUSD" => Ok(TokenSymbol::Husd),
            _ => Err(LedgerError::UnknownToken(s.to_string())),
        }
    }
}

/// Token metadata. Identity is immutable; the unit price is fixed at
/// startup and only ever read through the price oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: TokenSymbol,
    pub name: String,
    pub price: Decimal,
    pub contract: String,
}

impl TokenInfo {
    fn new(symbol: TokenSymbol, name: &str, price: Decimal, contract: &str) -> Self {
        Self {
            symbol,
            name: name.to_string(),
            price,
            contract: contract.to_string(),
        }
    }
}

/// The default token table.
pub fn default_tokens() -> Vec<TokenInfo> {
    vec![
        TokenInfo::new(TokenSymbol::Eth, "Ethereum", dec!(3500.00), "0xETH"),
        TokenInfo::new(TokenSymbol::Wbtc, "Wrapped Bitcoin", dec!(65000.00), "0xWBTC"),
        TokenInfo::new(TokenSymbol::Hype, "Hyperliquid Token", dec!(4.50), "0xHYPE"),
        TokenInfo::new(TokenSymbol::Usdc, "USD Coin", dec!(1.00), "0xUSDC"),
        TokenInfo::new(TokenSymbol::FeUsd, "Felix USD", dec!(0.99), "0xfeUSD"),
        TokenInfo::new(TokenSymbol::Husd, "Hyperliquid USD", dec!(1.00), "0xHUSD"),
    ]
}
