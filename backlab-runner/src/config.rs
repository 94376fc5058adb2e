//! Serializable run configuration (TOML).
//!
//! Thresholds are normalized at deserialization time: TOML floats and
//! integers pass through, numeric strings (`"30"`) are parsed, and anything
//! else is rejected with a config error. Indicator values compared against
//! textual literals are a silent-wrong-answer class in this domain, so the
//! coercion happens exactly once, here, and rules only ever see `f64`.

use backlab_core::indicators::{Ema, Indicator, Rsi, Sma};
use backlab_core::strategy::rules::{
    FixedStop, IndicatorThreshold, MeanReversionEntry, MeanReversionExit, PercentStop,
};
use backlab_core::strategy::{Cmp, Strategy};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid strategy config: {0}")]
    InvalidStrategy(String),
}

/// A numeric threshold that tolerates being written as a string.
///
/// `oversold = 30`, `oversold = 30.0`, and `oversold = "30"` all parse to
/// the same value; `oversold = "low"` is a hard config error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Threshold(pub f64);

impl<'de> Deserialize<'de> for Threshold {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ThresholdVisitor;

        impl<'de> de::Visitor<'de> for ThresholdVisitor {
            type Value = Threshold;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number or a numeric string")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Threshold, E> {
                Ok(Threshold(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Threshold, E> {
                Ok(Threshold(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Threshold, E> {
                Ok(Threshold(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Threshold, E> {
                v.trim().parse::<f64>().map(Threshold).map_err(|_| {
                    E::custom(format!("threshold is not numeric: {v:?}"))
                })
            }
        }

        deserializer.deserialize_any(ThresholdVisitor)
    }
}

/// Indicator periods attached to the bars before simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub fast_ema: usize,
    pub slow_sma: usize,
    pub rsi: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            fast_ema: 9,
            slow_sma: 50,
            rsi: 14,
        }
    }
}

impl IndicatorConfig {
    pub fn fast_name(&self) -> String {
        format!("ema_{}", self.fast_ema)
    }

    pub fn slow_name(&self) -> String {
        format!("sma_{}", self.slow_sma)
    }

    pub fn rsi_name(&self) -> String {
        format!("rsi_{}", self.rsi)
    }

    /// Build the indicator stack computed over the raw bars.
    pub fn stack(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Ema::new(self.fast_ema)),
            Box::new(Sma::new(self.slow_sma)),
            Box::new(Rsi::new(self.rsi)),
        ]
    }
}

/// Serializable strategy selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// The mean-reversion preset: enter when the fast MA is below the slow
    /// MA and RSI is oversold; exit on the mirrored overbought signal.
    MeanReversion {
        oversold: Threshold,
        overbought: Threshold,
        /// Exit only once the close is above the entry price.
        #[serde(default = "default_true")]
        require_profit: bool,
        /// Optional stop as a fraction below entry (0.05 = 5%).
        #[serde(default)]
        stop_loss_pct: Option<Threshold>,
    },
    /// A single indicator-vs-threshold rule on each side.
    Threshold {
        entry: ThresholdRule,
        exit: ThresholdRule,
        #[serde(default)]
        stop_level: Option<Threshold>,
    },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub indicator: String,
    pub cmp: Cmp,
    pub threshold: Threshold,
}

/// Complete configuration for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Path to the OHLCV CSV file.
    pub data: PathBuf,
    pub starting_capital: f64,
    /// Restrict the simulation to the last N bars after warm-up trimming.
    #[serde(default)]
    pub tail: Option<usize>,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    pub strategy: StrategyConfig,
}

impl RunConfig {
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the executable strategy this config describes.
    pub fn build_strategy(&self) -> Result<Strategy, ConfigError> {
        match &self.strategy {
            StrategyConfig::MeanReversion {
                oversold,
                overbought,
                require_profit,
                stop_loss_pct,
            } => {
                if oversold.0 >= overbought.0 {
                    return Err(ConfigError::InvalidStrategy(format!(
                        "oversold ({}) must be below overbought ({})",
                        oversold.0, overbought.0
                    )));
                }
                let entry = MeanReversionEntry {
                    fast_ma: self.indicators.fast_name(),
                    slow_ma: self.indicators.slow_name(),
                    rsi: self.indicators.rsi_name(),
                    oversold: oversold.0,
                };
                let exit = MeanReversionExit {
                    fast_ma: self.indicators.fast_name(),
                    slow_ma: self.indicators.slow_name(),
                    rsi: self.indicators.rsi_name(),
                    overbought: overbought.0,
                    require_profit: *require_profit,
                };
                let mut strategy = Strategy::new(entry, exit);
                if let Some(fraction) = stop_loss_pct {
                    if !(0.0..1.0).contains(&fraction.0) {
                        return Err(ConfigError::InvalidStrategy(format!(
                            "stop_loss_pct must be in [0, 1), got {}",
                            fraction.0
                        )));
                    }
                    strategy = strategy.with_stop_loss(PercentStop { fraction: fraction.0 });
                }
                Ok(strategy)
            }
            StrategyConfig::Threshold {
                entry,
                exit,
                stop_level,
            } => {
                let entry_rule =
                    IndicatorThreshold::new(entry.indicator.clone(), entry.cmp, entry.threshold.0);
                let exit_rule =
                    IndicatorThreshold::new(exit.indicator.clone(), exit.cmp, exit.threshold.0);
                let mut strategy = Strategy::new(entry_rule, exit_rule);
                if let Some(level) = stop_level {
                    strategy = strategy.with_stop_loss(FixedStop { level: level.0 });
                }
                Ok(strategy)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        data = "data/ETH-USD.csv"
        starting_capital = 10000.0
        tail = 180

        [indicators]
        fast_ema = 9
        slow_sma = 50
        rsi = 14

        [strategy]
        type = "mean_reversion"
        oversold = 30
        overbought = 70
    "#;

    #[test]
    fn parses_sample_config() {
        let config: RunConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.starting_capital, 10_000.0);
        assert_eq!(config.tail, Some(180));
        assert_eq!(config.indicators.slow_name(), "sma_50");
        assert!(matches!(
            config.strategy,
            StrategyConfig::MeanReversion {
                oversold: Threshold(v),
                ..
            } if v == 30.0
        ));
        assert!(config.build_strategy().is_ok());
    }

    #[test]
    fn numeric_string_thresholds_are_normalized() {
        let config: RunConfig = toml::from_str(
            r#"
            data = "bars.csv"
            starting_capital = 1000.0

            [strategy]
            type = "mean_reversion"
            oversold = "30"
            overbought = "70.5"
        "#,
        )
        .unwrap();
        match config.strategy {
            StrategyConfig::MeanReversion {
                oversold,
                overbought,
                ..
            } => {
                assert_eq!(oversold, Threshold(30.0));
                assert_eq!(overbought, Threshold(70.5));
            }
            other => panic!("unexpected strategy: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_threshold_is_rejected() {
        let result: Result<RunConfig, _> = toml::from_str(
            r#"
            data = "bars.csv"
            starting_capital = 1000.0

            [strategy]
            type = "mean_reversion"
            oversold = "low"
            overbought = 70
        "#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not numeric"), "unexpected error: {err}");
    }

    #[test]
    fn inverted_bands_are_rejected_at_build_time() {
        let config: RunConfig = toml::from_str(
            r#"
            data = "bars.csv"
            starting_capital = 1000.0

            [strategy]
            type = "mean_reversion"
            oversold = 70
            overbought = 30
        "#,
        )
        .unwrap();
        assert!(matches!(
            config.build_strategy(),
            Err(ConfigError::InvalidStrategy(_))
        ));
    }

    #[test]
    fn threshold_strategy_with_fixed_stop() {
        let config: RunConfig = toml::from_str(
            r#"
            data = "bars.csv"
            starting_capital = 1000.0

            [strategy]
            type = "threshold"
            stop_level = 95.0

            [strategy.entry]
            indicator = "rsi_14"
            cmp = "lt"
            threshold = 30

            [strategy.exit]
            indicator = "rsi_14"
            cmp = "gt"
            threshold = 70
        "#,
        )
        .unwrap();
        let strategy = config.build_strategy().unwrap();
        assert!(strategy.stop_loss.is_some());
    }

    #[test]
    fn default_indicator_periods() {
        let config: RunConfig = toml::from_str(
            r#"
            data = "bars.csv"
            starting_capital = 1000.0

            [strategy]
            type = "mean_reversion"
            oversold = 30
            overbought = 70
        "#,
        )
        .unwrap();
        assert_eq!(config.indicators, IndicatorConfig::default());
        assert_eq!(config.indicators.stack().len(), 3);
    }
}
