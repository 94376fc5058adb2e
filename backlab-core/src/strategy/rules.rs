//! Concrete rule implementations.
//!
//! All thresholds are strictly `f64`. Comparing an indicator against a
//! textual literal is unrepresentable here; configuration layers that parse
//! thresholds from text must normalize them to numbers before a rule is
//! ever constructed.

use super::{EntryRule, ExitRule, RuleError, StopLossRule};
use crate::domain::{Bar, Position};
use serde::{Deserialize, Serialize};

/// Numeric comparison operator for threshold rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cmp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    pub fn apply(self, left: f64, right: f64) -> bool {
        match self {
            Cmp::Lt => left < right,
            Cmp::Le => left <= right,
            Cmp::Gt => left > right,
            Cmp::Ge => left >= right,
        }
    }
}

fn lookup(bar: &Bar, name: &str) -> Result<f64, RuleError> {
    bar.indicator(name)
        .ok_or_else(|| RuleError::MissingIndicator(name.to_string()))
}

/// Compare a named indicator column against a fixed numeric threshold.
#[derive(Debug, Clone)]
pub struct IndicatorThreshold {
    pub indicator: String,
    pub cmp: Cmp,
    pub threshold: f64,
}

impl IndicatorThreshold {
    pub fn new(indicator: impl Into<String>, cmp: Cmp, threshold: f64) -> Self {
        Self {
            indicator: indicator.into(),
            cmp,
            threshold,
        }
    }

    fn evaluate(&self, bar: &Bar) -> Result<bool, RuleError> {
        Ok(self.cmp.apply(lookup(bar, &self.indicator)?, self.threshold))
    }
}

impl EntryRule for IndicatorThreshold {
    fn should_enter(&self, bar: &Bar) -> Result<bool, RuleError> {
        self.evaluate(bar)
    }
}

impl ExitRule for IndicatorThreshold {
    fn should_exit(&self, bar: &Bar, _position: &Position) -> Result<bool, RuleError> {
        self.evaluate(bar)
    }
}

/// Compare one indicator column against another (e.g. fast SMA vs slow SMA).
#[derive(Debug, Clone)]
pub struct IndicatorPair {
    pub left: String,
    pub cmp: Cmp,
    pub right: String,
}

impl IndicatorPair {
    pub fn new(left: impl Into<String>, cmp: Cmp, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            cmp,
            right: right.into(),
        }
    }

    fn evaluate(&self, bar: &Bar) -> Result<bool, RuleError> {
        Ok(self
            .cmp
            .apply(lookup(bar, &self.left)?, lookup(bar, &self.right)?))
    }
}

impl EntryRule for IndicatorPair {
    fn should_enter(&self, bar: &Bar) -> Result<bool, RuleError> {
        self.evaluate(bar)
    }
}

impl ExitRule for IndicatorPair {
    fn should_exit(&self, bar: &Bar, _position: &Position) -> Result<bool, RuleError> {
        self.evaluate(bar)
    }
}

/// Conjunction of entry rules: enters only when every member fires.
pub struct AllOf {
    pub rules: Vec<Box<dyn EntryRule>>,
}

impl AllOf {
    pub fn new(rules: Vec<Box<dyn EntryRule>>) -> Self {
        Self { rules }
    }
}

impl EntryRule for AllOf {
    fn should_enter(&self, bar: &Bar) -> Result<bool, RuleError> {
        for rule in &self.rules {
            if !rule.should_enter(bar)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Mean-reversion entry: fast MA below slow MA and RSI oversold.
#[derive(Debug, Clone)]
pub struct MeanReversionEntry {
    pub fast_ma: String,
    pub slow_ma: String,
    pub rsi: String,
    pub oversold: f64,
}

impl EntryRule for MeanReversionEntry {
    fn should_enter(&self, bar: &Bar) -> Result<bool, RuleError> {
        let fast = lookup(bar, &self.fast_ma)?;
        let slow = lookup(bar, &self.slow_ma)?;
        let rsi = lookup(bar, &self.rsi)?;
        Ok(fast < slow && rsi < self.oversold)
    }
}

/// Mean-reversion exit: fast MA back above slow MA and RSI overbought.
///
/// With `require_profit` set, the exit additionally waits until the close is
/// above the entry price.
#[derive(Debug, Clone)]
pub struct MeanReversionExit {
    pub fast_ma: String,
    pub slow_ma: String,
    pub rsi: String,
    pub overbought: f64,
    pub require_profit: bool,
}

impl ExitRule for MeanReversionExit {
    fn should_exit(&self, bar: &Bar, position: &Position) -> Result<bool, RuleError> {
        let fast = lookup(bar, &self.fast_ma)?;
        let slow = lookup(bar, &self.slow_ma)?;
        let rsi = lookup(bar, &self.rsi)?;
        let signal = fast > slow && rsi > self.overbought;
        if self.require_profit {
            Ok(signal && bar.close > position.entry_price)
        } else {
            Ok(signal)
        }
    }
}

/// Stop a fixed fraction below the entry price (e.g. 0.05 = 5% stop).
#[derive(Debug, Clone, Copy)]
pub struct PercentStop {
    pub fraction: f64,
}

impl StopLossRule for PercentStop {
    fn stop_level(&self, _bar: &Bar, position: &Position) -> Result<Option<f64>, RuleError> {
        Ok(Some(position.entry_price * (1.0 - self.fraction)))
    }
}

/// Stop at a fixed absolute price level.
#[derive(Debug, Clone, Copy)]
pub struct FixedStop {
    pub level: f64,
}

impl StopLossRule for FixedStop {
    fn stop_level(&self, _bar: &Bar, _position: &Position) -> Result<Option<f64>, RuleError> {
        Ok(Some(self.level))
    }
}
