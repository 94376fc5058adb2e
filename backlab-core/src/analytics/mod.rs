//! Performance analytics — pure functions over the finished trade log.
//!
//! Every function here depends only on its arguments (starting capital and
//! the trade sequence) and is idempotent: two calls on the same inputs give
//! bit-identical output. Equity and drawdown curves use per-trade
//! granularity throughout: index 0 is the pre-trade state, index n is the
//! state after the n-th trade.

use crate::domain::Trade;
use serde::{Deserialize, Serialize};

/// Summary statistics for one backtest run.
///
/// For a zero-trade run every field is well-defined: counts, rates, and
/// ratios all default to zero rather than NaN or a panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub starting_capital: f64,
    pub final_capital: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// winning_trades / total_trades, 0.0 when there are no trades.
    pub win_rate: f64,
    pub total_profit: f64,
    pub avg_profit: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// gross wins / gross losses, 0.0 when there are no losing trades.
    pub profit_factor: f64,
    /// Deepest peak-to-trough equity decline, in capital units (>= 0).
    pub max_drawdown: f64,
    /// Max drawdown as a fraction of the equity peak it fell from.
    pub max_drawdown_pct: f64,
    pub avg_bars_held: f64,
}

/// Compute summary statistics in a single pass over the trade log.
pub fn analyze(starting_capital: f64, trades: &[Trade]) -> Analysis {
    let mut winning_trades = 0usize;
    let mut losing_trades = 0usize;
    let mut total_profit = 0.0;
    let mut gross_wins = 0.0;
    let mut gross_losses = 0.0;
    let mut largest_win = 0.0f64;
    let mut largest_loss = 0.0f64;
    let mut total_bars_held = 0usize;

    let mut equity = starting_capital;
    let mut peak = starting_capital;
    let mut max_drawdown = 0.0f64;
    let mut max_drawdown_pct = 0.0f64;

    for trade in trades {
        total_profit += trade.profit;
        total_bars_held += trade.bars_held;

        if trade.profit > 0.0 {
            winning_trades += 1;
            gross_wins += trade.profit;
            largest_win = largest_win.max(trade.profit);
        } else {
            losing_trades += 1;
            gross_losses += -trade.profit;
            largest_loss = largest_loss.max(-trade.profit);
        }

        equity += trade.profit;
        if equity > peak {
            peak = equity;
        }
        let drawdown = peak - equity;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
            max_drawdown_pct = if peak > 0.0 { drawdown / peak } else { 0.0 };
        }
    }

    let total_trades = trades.len();
    let n = total_trades as f64;

    Analysis {
        starting_capital,
        final_capital: equity,
        total_trades,
        winning_trades,
        losing_trades,
        win_rate: if total_trades > 0 {
            winning_trades as f64 / n
        } else {
            0.0
        },
        total_profit,
        avg_profit: if total_trades > 0 { total_profit / n } else { 0.0 },
        avg_win: if winning_trades > 0 {
            gross_wins / winning_trades as f64
        } else {
            0.0
        },
        avg_loss: if losing_trades > 0 {
            gross_losses / losing_trades as f64
        } else {
            0.0
        },
        largest_win,
        largest_loss,
        profit_factor: if gross_losses > 0.0 {
            gross_wins / gross_losses
        } else {
            0.0
        },
        max_drawdown,
        max_drawdown_pct,
        avg_bars_held: if total_trades > 0 {
            total_bars_held as f64 / n
        } else {
            0.0
        },
    }
}

/// Running account value: starting capital, then one point per trade.
///
/// `curve[n] == starting_capital + sum of the first n trade profits`.
pub fn compute_equity_curve(starting_capital: f64, trades: &[Trade]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(trades.len() + 1);
    let mut equity = starting_capital;
    curve.push(equity);
    for trade in trades {
        equity += trade.profit;
        curve.push(equity);
    }
    curve
}

/// Distance below the running equity peak, one point per equity point.
///
/// Always >= 0; exactly 0 wherever the equity curve sets a new peak
/// (including index 0).
pub fn compute_drawdown(starting_capital: f64, trades: &[Trade]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(trades.len() + 1);
    let mut equity = starting_capital;
    let mut peak = starting_capital;
    curve.push(0.0);
    for trade in trades {
        equity += trade.profit;
        if equity > peak {
            peak = equity;
        }
        curve.push(peak - equity);
    }
    curve
}
