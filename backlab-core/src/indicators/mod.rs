//! Streaming indicator transforms attached to bars before simulation.
//!
//! Indicators are computed once over the whole series and written onto each
//! bar's `indicators` map under the indicator's name. The first `lookback()`
//! values of a series are NaN (warm-up) and are never attached: a rule that
//! touches a warm-up bar fails loudly with a missing-indicator error instead
//! of comparing against garbage. [`trim_warmup`] drops the warm-up prefix so
//! the simulated range only contains fully-populated bars.

pub mod ema;
pub mod rsi;
pub mod sma;

pub use ema::Ema;
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Bar;

/// A single-series indicator computed over close prices.
pub trait Indicator: Send + Sync {
    /// Column name this indicator writes (e.g. `"sma_50"`).
    fn name(&self) -> &str;

    /// Number of leading bars with no valid value.
    fn lookback(&self) -> usize;

    /// Compute one value per bar; NaN during warm-up.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Longest warm-up across a set of indicators.
pub fn max_lookback(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|ind| ind.lookback()).max().unwrap_or(0)
}

/// Compute every indicator and attach the valid values to the bars.
pub fn enrich(bars: &mut [Bar], indicators: &[Box<dyn Indicator>]) {
    for indicator in indicators {
        let values = indicator.compute(bars);
        for (bar, value) in bars.iter_mut().zip(values) {
            if value.is_finite() {
                bar.indicators.insert(indicator.name().to_string(), value);
            }
        }
    }
}

/// Drop the warm-up prefix so every remaining bar carries every column.
pub fn trim_warmup(mut bars: Vec<Bar>, indicators: &[Box<dyn Indicator>]) -> Vec<Bar> {
    let skip = max_lookback(indicators).min(bars.len());
    bars.drain(..skip);
    bars
}

/// Build bars from close prices for tests: open = previous close,
/// high/low bracket open and close by 1.0, volume fixed.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                time: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
                indicators: Default::default(),
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, epsilon={epsilon}"
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrich_skips_warmup_values() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let indicators: Vec<Box<dyn Indicator>> = vec![Box::new(Sma::new(3))];
        enrich(&mut bars, &indicators);

        assert_eq!(bars[0].indicator("sma_3"), None);
        assert_eq!(bars[1].indicator("sma_3"), None);
        assert_eq!(bars[2].indicator("sma_3"), Some(11.0));
        assert_eq!(bars[4].indicator("sma_3"), Some(13.0));
    }

    #[test]
    fn trim_warmup_drops_longest_lookback() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let indicators: Vec<Box<dyn Indicator>> =
            vec![Box::new(Sma::new(3)), Box::new(Sma::new(5))];
        enrich(&mut bars, &indicators);
        let trimmed = trim_warmup(bars, &indicators);

        assert_eq!(trimmed.len(), 2);
        assert!(trimmed
            .iter()
            .all(|bar| bar.indicator("sma_3").is_some() && bar.indicator("sma_5").is_some()));
    }

    #[test]
    fn trim_warmup_on_short_series_empties() {
        let bars = make_bars(&[10.0, 11.0]);
        let indicators: Vec<Box<dyn Indicator>> = vec![Box::new(Sma::new(5))];
        assert!(trim_warmup(bars, &indicators).is_empty());
    }
}
