//! Typed error taxonomy for ledger operations
//!
//! Every validation failure maps to exactly one variant, detected before
//! any mutation. Errors cross the facade boundary as values, never as
//! panics.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::tokens::TokenSymbol;

/// Convenient result alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },

    #[error("insufficient {token} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        token: TokenSymbol,
        requested: Decimal,
        available: Decimal,
    },

    #[error("unknown token: {0}")]
    UnknownToken(String),

    #[error("health factor {health_factor} is below the minimum {minimum}")]
    HealthFactorTooLow {
        health_factor: Decimal,
        minimum: Decimal,
    },

    #[error("borrow limit exceeded for {token}: debt value {debt_value} over limit {limit_value}")]
    BorrowLimitExceeded {
        token: TokenSymbol,
        debt_value: Decimal,
        limit_value: Decimal,
    },

    #[error("must supply {token} before borrowing")]
    MustSupplyFirst { token: TokenSymbol },

    #[error("no outstanding {token} debt to repay")]
    NoOutstandingDebt { token: TokenSymbol },

    #[error("withdraw amount {requested} exceeds supplied {token} balance {supplied}")]
    InsufficientSupplied {
        token: TokenSymbol,
        requested: Decimal,
        supplied: Decimal,
    },

    #[error("withdraw amount {requested} exceeds stability deposit {deposited}")]
    ExceedsDeposit {
        requested: Decimal,
        deposited: Decimal,
    },

    #[error("refresh failed: {0}")]
    RefreshError(String),

    #[error("operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl LedgerError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount { .. } => "INVALID_AMOUNT",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::UnknownToken(_) => "UNKNOWN_TOKEN",
            LedgerError::HealthFactorTooLow { .. } => "HEALTH_FACTOR_TOO_LOW",
            LedgerError::BorrowLimitExceeded { .. } => "BORROW_LIMIT_EXCEEDED",
            LedgerError::MustSupplyFirst { .. } => "MUST_SUPPLY_FIRST",
            LedgerError::NoOutstandingDebt { .. } => "NO_OUTSTANDING_DEBT",
            LedgerError::InsufficientSupplied { .. } => "INSUFFICIENT_SUPPLIED",
            LedgerError::ExceedsDeposit { .. } => "EXCEEDS_DEPOSIT",
            LedgerError::RefreshError(_) => "REFRESH_ERROR",
            LedgerError::Timeout { .. } => "TIMEOUT",
        }
    }

    /// Whether the error is a pre-commit validation rejection (as opposed
    /// to a transport-level failure like a timeout or refresh error).
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            LedgerError::RefreshError(_) | LedgerError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn error_display_carries_amounts() {
        let err = LedgerError::InsufficientBalance {
            token: TokenSymbol::Eth,
            requested: dec!(10),
            available: dec!(5),
        };
        let message = err.to_string();
        assert!(message.contains("ETH"));
        assert!(message.contains("10"));
        assert!(message.contains("5"));
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            LedgerError::HealthFactorTooLow {
                health_factor: dec!(0.9),
                minimum: dec!(1.1),
            }
            .code(),
            "HEALTH_FACTOR_TOO_LOW"
        );
        assert_eq!(
            LedgerError::UnknownToken("DOGE".into()).code(),
            "UNKNOWN_TOKEN"
        );
    }

    #[test]
    fn validation_classification() {
        assert!(LedgerError::InvalidAmount { amount: dec!(-1) }.is_validation());
        assert!(!LedgerError::RefreshError("tick".into()).is_validation());
        assert!(!LedgerError::Timeout { timeout_ms: 30000 }.is_validation());
    }
}
