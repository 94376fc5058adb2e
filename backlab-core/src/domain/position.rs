//! Position — transient state while the engine holds an open trade.

use chrono::NaiveDate;

/// A single open long position.
///
/// This doubles as the read-only context handed to exit and stop-loss rules
/// every bar, so rule evaluation is a pure function of (bar, position) and
/// never needs to capture mutable state across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_time: NaiveDate,
    pub entry_price: f64,
    /// Index of the entry bar within the simulated range.
    pub entry_bar: usize,
    /// Bars since entry. 0 on the entry bar itself; by the time a rule sees
    /// the position on a later bar, this equals that bar's distance from
    /// the entry bar.
    pub bars_held: usize,
    /// Last stop level computed by the stop-loss rule, if any.
    pub stop_level: Option<f64>,
}

impl Position {
    pub fn open(entry_time: NaiveDate, entry_price: f64, entry_bar: usize) -> Self {
        Self {
            entry_time,
            entry_price,
            entry_bar,
            bars_held: 0,
            stop_level: None,
        }
    }

    /// Unrealized profit per unit at the given price.
    pub fn unrealized_profit(&self, current_price: f64) -> f64 {
        current_price - self.entry_price
    }
}
