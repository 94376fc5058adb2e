//! Backlab Core — single-asset, rule-based backtesting engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, positions, trades)
//! - Strategy rules (entry, exit, stop-loss) as pure predicates
//! - The FLAT/OPEN bar loop with intrabar stop-loss priority
//! - Analytics over the trade log (summary stats, equity, drawdown)
//! - Indicator transforms (SMA, EMA, RSI) with explicit warm-up handling
//!
//! The core performs no I/O and no logging: bars arrive fully materialized,
//! and every failure is surfaced to the caller as a typed error.

pub mod analytics;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;

pub use analytics::{analyze, compute_drawdown, compute_equity_curve, Analysis};
pub use domain::{Bar, ExitReason, Position, Trade};
pub use engine::{backtest, BacktestError, ValidationError};
pub use strategy::{EntryRule, ExitRule, RuleError, StopLossRule, Strategy};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types handed across threads during parallel
    /// sweeps are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();
        require_send::<domain::ExitReason>();
        require_sync::<domain::ExitReason>();
        require_send::<analytics::Analysis>();
        require_sync::<analytics::Analysis>();
        require_send::<strategy::Strategy>();
        require_sync::<strategy::Strategy>();
    }
}
