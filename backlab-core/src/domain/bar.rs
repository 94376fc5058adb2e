//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One OHLCV observation plus any attached indicator columns.
///
/// Bars are immutable once the indicator stage has run; the engine never
/// writes to them. Indicator columns are keyed by name (`"sma_50"`,
/// `"rsi_14"`, ...) and always hold plain `f64` values, so rule thresholds
/// can only ever be compared number-to-number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub time: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub indicators: BTreeMap<String, f64>,
}

impl Bar {
    /// Look up an indicator column by name.
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).copied()
    }

    /// Basic OHLCV sanity check: finite positive prices, high/low bracket
    /// open and close, non-negative volume.
    pub fn is_sane(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            time: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            open: 1500.0,
            high: 1560.0,
            low: 1480.0,
            close: 1550.0,
            volume: 25_000.0,
            indicators: BTreeMap::from([("rsi_14".to_string(), 42.5)]),
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_rejects_nan_close() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_inverted_high_low() {
        let mut bar = sample_bar();
        bar.high = 1470.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_negative_volume() {
        let mut bar = sample_bar();
        bar.volume = -1.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn indicator_lookup() {
        let bar = sample_bar();
        assert_eq!(bar.indicator("rsi_14"), Some(42.5));
        assert_eq!(bar.indicator("sma_50"), None);
    }
}
