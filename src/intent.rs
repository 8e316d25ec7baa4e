//! Rule-based intent parser: free text → ledger command
//!
//! Pattern-matching glue for the conversational collaborator. It contains
//! no business rules; validation still happens in the engine.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::tokens::TokenSymbol;

/// A recognized user intention, ready to dispatch to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    OpenCdp {
        collateral: TokenSymbol,
        amount: Decimal,
    },
    SupplyLending {
        token: TokenSymbol,
        amount: Decimal,
    },
    BorrowLending {
        token: TokenSymbol,
        amount: Decimal,
    },
    DepositStability {
        token: TokenSymbol,
        amount: Decimal,
    },
}

static OPEN_CDP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"open (?:a )?cdp (?:with|using)? ?([\d.]+) ([a-zA-Z]+)").expect("valid regex")
});
static SUPPLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"supply ([\d.]+) ([a-zA-Z]+) to (?:the )?lending pool").expect("valid regex")
});
static BORROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"borrow ([\d.]+) ([a-zA-Z]+) from (?:the )?lending pool").expect("valid regex")
});
static DEPOSIT_STABILITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"deposit ([\d.]+) ([a-zA-Z]+) to (?:the )?stability pool").expect("valid regex")
});

/// Match free text against the known command patterns.
///
/// Returns `None` when nothing matches, the amount does not parse, or the
/// token is not registered; the caller decides the fallback (typically
/// handing the text to the conversational assistant).
pub fn parse(input: &str) -> Option<Intent> {
    let lower = input.to_lowercase();

    if let Some(caps) = OPEN_CDP.captures(&lower) {
        let (amount, collateral) = amount_and_token(&caps)?;
        return Some(Intent::OpenCdp { collateral, amount });
    }
    if let Some(caps) = SUPPLY.captures(&lower) {
        let (amount, token) = amount_and_token(&caps)?;
        return Some(Intent::SupplyLending { token, amount });
    }
    if let Some(caps) = BORROW.captures(&lower) {
        let (amount, token) = amount_and_token(&caps)?;
        return Some(Intent::BorrowLending { token, amount });
    }
    if let Some(caps) = DEPOSIT_STABILITY.captures(&lower) {
        let (amount, token) = amount_and_token(&caps)?;
        return Some(Intent::DepositStability { token, amount });
    }
    None
}

fn amount_and_token(caps: &regex::Captures<'_>) -> Option<(Decimal, TokenSymbol)> {
    let amount = Decimal::from_str(caps.get(1)?.as_str()).ok()?;
    let token = caps.get(2)?.as_str().parse().ok()?;
    Some((amount, token))
}
