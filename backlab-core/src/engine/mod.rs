//! Bar-by-bar simulation loop — the heart of the backtesting engine.
//!
//! The engine is a two-state machine (FLAT/OPEN) walked once over the bar
//! series. Per bar, exactly one branch runs:
//!
//! - OPEN: re-evaluate the stop-loss level, check it against the bar's low
//!   (an intrabar trigger beats any end-of-bar signal), then the exit rule
//!   against the close, else stay open.
//! - FLAT: evaluate the entry rule; on trigger, open at the bar's close.
//!
//! Decisions are made on a bar's closing values and executed at that same
//! close. This is optimistic but deliberate: switching to next-bar
//! execution changes results materially, so the convention is fixed here
//! rather than left to callers.

pub mod validate;

pub use validate::{validate_bars, ValidationError};

use crate::domain::{Bar, ExitReason, Position, Trade};
use crate::strategy::{RuleError, Strategy};
use thiserror::Error;

/// Terminal failures of a backtest run.
///
/// A run either fully succeeds or fails outright; there is no partial trade
/// log and no retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BacktestError {
    #[error("input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("rule evaluation failed: {0}")]
    Rule(#[from] RuleError),
}

/// Run the strategy over the bar series and return the completed trade log.
///
/// The series is validated up front: an empty series, a malformed bar, or a
/// non-increasing timestamp fails the run before the walk starts, never
/// mid-walk. If the position is still open after the last bar it is
/// force-closed at that bar's close with [`ExitReason::EndOfSeries`], so
/// every opened position appears in the log.
pub fn backtest(strategy: &Strategy, bars: &[Bar]) -> Result<Vec<Trade>, BacktestError> {
    validate_bars(bars)?;

    let mut trades = Vec::new();
    let mut open: Option<Position> = None;

    for (index, bar) in bars.iter().enumerate() {
        match open.take() {
            Some(mut position) => {
                // Rules see bars_held == current index - entry bar, the same
                // count a trade closed this bar would report.
                position.bars_held += 1;

                // Stop-loss first: the stop is an intrabar trigger and takes
                // priority over the end-of-bar exit rule.
                if let Some(stop) = &strategy.stop_loss {
                    position.stop_level = stop.stop_level(bar, &position)?;
                }
                if let Some(level) = position.stop_level {
                    if bar.low <= level {
                        trades.push(close_position(&position, bar, level, index, ExitReason::StopLoss));
                        continue;
                    }
                }

                if strategy.exit.should_exit(bar, &position)? {
                    trades.push(close_position(
                        &position,
                        bar,
                        bar.close,
                        index,
                        ExitReason::RuleExit,
                    ));
                } else {
                    open = Some(position);
                }
            }
            None => {
                if strategy.entry.should_enter(bar)? {
                    open = Some(Position::open(bar.time, bar.close, index));
                }
            }
        }
    }

    if let Some(position) = open {
        let last_index = bars.len() - 1;
        let last = &bars[last_index];
        trades.push(close_position(
            &position,
            last,
            last.close,
            last_index,
            ExitReason::EndOfSeries,
        ));
    }

    Ok(trades)
}

fn close_position(
    position: &Position,
    exit_bar: &Bar,
    exit_price: f64,
    exit_index: usize,
    exit_reason: ExitReason,
) -> Trade {
    let profit = exit_price - position.entry_price;
    Trade {
        entry_time: position.entry_time,
        entry_price: position.entry_price,
        exit_time: exit_bar.time,
        exit_price,
        profit,
        profit_pct: profit / position.entry_price,
        bars_held: exit_index - position.entry_bar,
        exit_reason,
    }
}
