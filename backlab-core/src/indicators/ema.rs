//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], with
//! alpha = 2 / (period + 1). Seeded with the SMA of the first `period`
//! closes, so the first valid value is at index period - 1.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        let alpha = 2.0 / (self.period as f64 + 1.0);
        let seed: f64 =
            bars.iter().take(self.period).map(|b| b.close).sum::<f64>() / self.period as f64;
        result[self.period - 1] = seed;

        let mut prev = seed;
        for i in self.period..n {
            prev = alpha * bars[i].close + (1.0 - alpha) * prev;
            result[i] = prev;
        }

        result
    }
}
