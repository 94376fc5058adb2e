//! Trade — a completed round-trip, the engine's unit of output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// The exit rule fired against the bar's closing values.
    RuleExit,
    /// The bar's low breached the stop level; closed at the stop price.
    StopLoss,
    /// The series ended while the position was open; closed at the last close.
    EndOfSeries,
}

/// A complete entry → exit round trip.
///
/// Trades are recorded in chronological order and never overlap: the engine
/// holds at most one position at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: NaiveDate,
    pub entry_price: f64,
    pub exit_time: NaiveDate,
    pub exit_price: f64,
    /// exit_price - entry_price (all-in/all-out, one unit).
    pub profit: f64,
    /// profit / entry_price.
    pub profit_pct: f64,
    /// Bars between entry and exit.
    pub bars_held: usize,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> Trade {
        Trade {
            entry_time: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            entry_price: 100.0,
            exit_time: NaiveDate::from_ymd_opt(2021, 3, 8).unwrap(),
            exit_price: 112.0,
            profit: 12.0,
            profit_pct: 0.12,
            bars_held: 7,
            exit_reason: ExitReason::RuleExit,
        }
    }

    #[test]
    fn is_winner() {
        assert!(sample_trade().is_winner());
        let mut loser = sample_trade();
        loser.profit = -3.0;
        assert!(!loser.is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade.entry_time, deser.entry_time);
        assert_eq!(trade.exit_price, deser.exit_price);
        assert_eq!(trade.exit_reason, deser.exit_reason);
    }
}
