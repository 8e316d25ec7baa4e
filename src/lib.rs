//! felix-ledger: a simulated DeFi accounting engine
//!
//! Models collateralized debt positions, a pooled lending market, and a
//! stability pool over a single user's token balances. All mutating
//! operations flow through [`engine::LedgerEngine`], which validates
//! against the price oracle and the sub-ledgers and commits atomically;
//! queries return immutable snapshots.

pub mod balances;
pub mod cdp;
pub mod config;
pub mod engine;
pub mod error;
pub mod intent;
pub mod lending;
pub mod oracle;
pub mod refresh;
pub mod stability;
pub mod state;
pub mod tokens;
pub mod types;

pub use config::{EngineConfig, LedgerConfig, RefreshConfig};
pub use engine::LedgerEngine;
pub use error::{LedgerError, Result};
pub use state::LedgerState;
pub use tokens::{TokenSymbol, STABLECOIN};
