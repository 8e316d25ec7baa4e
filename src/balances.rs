//! Balance ledger: the authoritative free-balance map for the user

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::error::{LedgerError, Result};
use crate::tokens::TokenSymbol;
use crate::types::Balance;

/// Token symbol → free (unencumbered) amount. Entries are created on
/// first credit and never deleted; they may sit at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceLedger {
    entries: BTreeMap<TokenSymbol, Decimal>,
}

impl BalanceLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Ledger seeded with the demo wallet balances.
    pub fn seeded() -> Self {
        let mut ledger = Self::new();
        for (symbol, amount) in [
            (TokenSymbol::Eth, dec!(5)),
            (TokenSymbol::Wbtc, dec!(0.2)),
            (TokenSymbol::Hype, dec!(15000)),
            (TokenSymbol::Usdc, dec!(25000)),
            (TokenSymbol::FeUsd, dec!(1200)),
            (TokenSymbol::Husd, dec!(0)),
        ] {
            ledger.entries.insert(symbol, amount);
        }
        ledger
    }

    /// Current amount for a symbol; zero when never credited.
    pub fn get(&self, symbol: TokenSymbol) -> Decimal {
        self.entries.get(&symbol).copied().unwrap_or(Decimal::ZERO)
    }

    /// Add to a balance. Fails only for negative amounts.
    pub fn credit(&mut self, symbol: TokenSymbol, amount: Decimal) -> Result<()> {
        if amount.is_sign_negative() {
            return Err(LedgerError::InvalidAmount { amount });
        }
        *self.entries.entry(symbol).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    /// Remove from a balance. Atomic check-then-act: on failure the entry
    /// is untouched.
    pub fn debit(&mut self, symbol: TokenSymbol, amount: Decimal) -> Result<()> {
        if amount.is_sign_negative() {
            return Err(LedgerError::InvalidAmount { amount });
        }
        self.ensure_available(symbol, amount)?;
        *self.entries.entry(symbol).or_insert(Decimal::ZERO) -= amount;
        Ok(())
    }

    /// Validation-only form of the debit check, used by operations that
    /// must finish all validation before mutating anything.
    pub fn ensure_available(&self, symbol: TokenSymbol, amount: Decimal) -> Result<()> {
        let available = self.get(symbol);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token: symbol,
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    /// Snapshot of all entries, in display order.
    pub fn list(&self) -> Vec<Balance> {
        self.entries
            .iter()
            .map(|(&symbol, &amount)| Balance { symbol, amount })
            .collect()
    }
}

impl Default for BalanceLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_creates_entry_on_first_use() {
        let mut ledger = BalanceLedger::new();
        assert_eq!(ledger.get(TokenSymbol::Eth), Decimal::ZERO);
        ledger.credit(TokenSymbol::Eth, dec!(2.5)).unwrap();
        assert_eq!(ledger.get(TokenSymbol::Eth), dec!(2.5));
    }

    #[test]
    fn debit_rejects_overdraw_without_mutation() {
        let mut ledger = BalanceLedger::seeded();
        let before = ledger.clone();
        let err = ledger.debit(TokenSymbol::Eth, dec!(6)).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_BALANCE");
        assert_eq!(ledger, before);
    }

    #[test]
    fn debit_to_zero_keeps_entry() {
        let mut ledger = BalanceLedger::seeded();
        ledger.debit(TokenSymbol::Eth, dec!(5)).unwrap();
        assert_eq!(ledger.get(TokenSymbol::Eth), Decimal::ZERO);
        assert!(ledger.list().iter().any(|b| b.symbol == TokenSymbol::Eth));
    }

    #[test]
    fn negative_amounts_are_invalid() {
        let mut ledger = BalanceLedger::seeded();
        assert_eq!(
            ledger.credit(TokenSymbol::Eth, dec!(-1)).unwrap_err().code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            ledger.debit(TokenSymbol::Eth, dec!(-1)).unwrap_err().code(),
            "INVALID_AMOUNT"
        );
    }

    #[test]
    fn seeded_balances_match_demo_wallet() {
        let ledger = BalanceLedger::seeded();
        assert_eq!(ledger.get(TokenSymbol::Usdc), dec!(25000));
        assert_eq!(ledger.get(TokenSymbol::FeUsd), dec!(1200));
        assert_eq!(ledger.get(TokenSymbol::Husd), Decimal::ZERO);
        assert_eq!(ledger.list().len(), 6);
    }
}
