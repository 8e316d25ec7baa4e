//! Property tests: conservation, atomicity, and the borrow-limit
//! invariant over random operation sequences

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use felix_ledger::lending::BORROW_FACTOR;
use felix_ledger::state::LedgerState;
use felix_ledger::tokens::{TokenSymbol, STABLECOIN};

#[derive(Debug, Clone)]
enum Op {
    OpenCdp { token: TokenSymbol, collateral: Decimal, mint: Decimal },
    Supply { token: TokenSymbol, amount: Decimal },
    Withdraw { token: TokenSymbol, amount: Decimal },
    Borrow { token: TokenSymbol, amount: Decimal },
    Repay { token: TokenSymbol, amount: Decimal },
    DepositStability { amount: Decimal },
    WithdrawStability { amount: Decimal },
}

fn token_strategy() -> impl Strategy<Value = TokenSymbol> {
    prop::sample::select(TokenSymbol::ALL.to_vec())
}

/// Small positive decimals with up to two fractional digits.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1u64..=500_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (token_strategy(), amount_strategy(), amount_strategy()).prop_map(
            |(token, collateral, mint)| Op::OpenCdp {
                token,
                collateral,
                mint,
            }
        ),
        (token_strategy(), amount_strategy())
            .prop_map(|(token, amount)| Op::Supply { token, amount }),
        (token_strategy(), amount_strategy())
            .prop_map(|(token, amount)| Op::Withdraw { token, amount }),
        (token_strategy(), amount_strategy())
            .prop_map(|(token, amount)| Op::Borrow { token, amount }),
        (token_strategy(), amount_strategy())
            .prop_map(|(token, amount)| Op::Repay { token, amount }),
        amount_strategy().prop_map(|amount| Op::DepositStability { amount }),
        amount_strategy().prop_map(|amount| Op::WithdrawStability { amount }),
    ]
}

/// A generously funded clean session, so every operation has a realistic
/// chance of both succeeding and failing.
fn funded_state() -> LedgerState {
    let mut state = LedgerState::new();
    for token in TokenSymbol::ALL {
        state.fund(token, dec!(10000)).unwrap();
    }
    state
}

fn apply(state: &mut LedgerState, op: &Op) -> Result<(), felix_ledger::LedgerError> {
    match *op {
        Op::OpenCdp {
            token,
            collateral,
            mint,
        } => state.open_cdp(token, collateral, mint).map(|_| ()),
        Op::Supply { token, amount } => state.supply(token, amount),
        Op::Withdraw { token, amount } => state.withdraw(token, amount),
        Op::Borrow { token, amount } => state.borrow(token, amount),
        Op::Repay { token, amount } => state.repay(token, amount).map(|_| ()),
        Op::DepositStability { amount } => state.deposit_stability(amount),
        Op::WithdrawStability { amount } => state.withdraw_stability(amount),
    }
}

/// Net portfolio value: free balances plus locked collateral plus
/// supplied funds plus the stability deposit, minus CDP debt and
/// borrowed amounts, all at oracle prices. Every operation — including
/// opening a CDP, where the minted stablecoin and the recorded debt
/// cancel — preserves this exactly.
fn net_portfolio_value(state: &LedgerState) -> Decimal {
    let price = |t: TokenSymbol| state.oracle().price(t).unwrap();
    let mut total = Decimal::ZERO;
    for balance in state.balances() {
        total += balance.amount * price(balance.symbol);
    }
    for cdp in state.cdp_positions() {
        total += cdp.collateral_amount * price(cdp.collateral_token);
        total -= cdp.debt_amount * price(STABLECOIN);
    }
    for position in state.user_lending_positions() {
        total += position.supplied_amount * price(position.token);
        total -= position.borrowed_amount * price(position.token);
    }
    total += state.user_stability_deposit().deposited_amount * price(STABLECOIN);
    total
}

proptest! {
    #[test]
    fn conservation_holds_across_random_sequences(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut state = funded_state();
        let initial = net_portfolio_value(&state);
        for op in &ops {
            let _ = apply(&mut state, op);
            prop_assert_eq!(net_portfolio_value(&state), initial);
        }
    }

    #[test]
    fn failed_operations_are_atomic(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut state = funded_state();
        for op in &ops {
            let before = state.clone();
            if apply(&mut state, op).is_err() {
                prop_assert_eq!(&state, &before);
            }
        }
    }

    #[test]
    fn borrow_limit_holds_at_rest(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut state = funded_state();
        for op in &ops {
            let _ = apply(&mut state, op);
            for position in state.user_lending_positions() {
                let price = state.oracle().price(position.token).unwrap();
                prop_assert!(
                    position.borrowed_amount * price
                        <= position.supplied_amount * price * BORROW_FACTOR
                );
            }
        }
    }

    #[test]
    fn cdp_health_holds_at_creation(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut state = funded_state();
        for op in &ops {
            let count_before = state.cdp_positions().len();
            let _ = apply(&mut state, op);
            let positions = state.cdp_positions();
            if positions.len() > count_before {
                let newest = positions.last().unwrap();
                prop_assert!(newest.health_factor >= felix_ledger::cdp::MIN_HEALTH_FACTOR);
            }
        }
    }

    #[test]
    fn amounts_never_go_negative(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut state = funded_state();
        for op in &ops {
            let _ = apply(&mut state, op);
        }
        for balance in state.balances() {
            prop_assert!(balance.amount >= Decimal::ZERO);
        }
        for position in state.user_lending_positions() {
            prop_assert!(position.supplied_amount >= Decimal::ZERO);
            prop_assert!(position.borrowed_amount >= Decimal::ZERO);
        }
        prop_assert!(state.user_stability_deposit().deposited_amount >= Decimal::ZERO);
        prop_assert!(state.stability_pool().total_deposited >= Decimal::ZERO);
    }
}

#[test]
fn projections_are_idempotent() {
    let state = LedgerState::seeded();
    assert_eq!(state.balances(), state.balances());
    assert_eq!(state.cdp_positions(), state.cdp_positions());
    assert_eq!(state.lending_pools(), state.lending_pools());
    assert_eq!(state.user_lending_positions(), state.user_lending_positions());
    assert_eq!(state.stability_pool(), state.stability_pool());
    assert_eq!(state.user_stability_deposit(), state.user_stability_deposit());
}
