//! Single-run orchestration: load bars, attach indicators, trim warm-up,
//! simulate, analyze.

use anyhow::{bail, Context, Result};
use backlab_core::analytics::{analyze, compute_drawdown, compute_equity_curve, Analysis};
use backlab_core::domain::{Bar, Trade};
use backlab_core::engine::backtest;
use backlab_core::indicators::{enrich, trim_warmup};

use crate::config::RunConfig;
use crate::data_loader::load_bars_csv;

/// Everything a finished run produces.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub trades: Vec<Trade>,
    pub analysis: Analysis,
    pub equity_curve: Vec<f64>,
    pub drawdown: Vec<f64>,
    /// Bars actually walked after warm-up trimming and the tail cut.
    pub bars_simulated: usize,
}

/// Load the configured data file and run the backtest end to end.
pub fn run_from_config(config: &RunConfig) -> Result<RunOutcome> {
    let bars = load_bars_csv(&config.data)
        .with_context(|| format!("loading bars from {}", config.data.display()))?;
    run_prepared(bars, config)
}

/// Run a backtest over already-loaded raw bars.
///
/// The bars are enriched with the configured indicator stack, the warm-up
/// prefix is dropped, and the optional tail cut keeps only the most recent
/// N bars, mirroring the usual prepare-then-simulate pipeline. Sweeps call
/// this directly so the CSV is only read once.
pub fn run_prepared(mut bars: Vec<Bar>, config: &RunConfig) -> Result<RunOutcome> {
    let strategy = config.build_strategy()?;
    let indicators = config.indicators.stack();

    enrich(&mut bars, &indicators);
    let mut bars = trim_warmup(bars, &indicators);
    if bars.is_empty() {
        bail!(
            "no bars left after indicator warm-up (need more than {} bars)",
            backlab_core::indicators::max_lookback(&indicators)
        );
    }

    if let Some(tail) = config.tail {
        if tail == 0 {
            bail!("tail must be at least 1");
        }
        if tail < bars.len() {
            bars.drain(..bars.len() - tail);
        }
    }

    let trades = backtest(&strategy, &bars).context("backtest run failed")?;
    let analysis = analyze(config.starting_capital, &trades);
    let equity_curve = compute_equity_curve(config.starting_capital, &trades);
    let drawdown = compute_drawdown(config.starting_capital, &trades);

    Ok(RunOutcome {
        trades,
        analysis,
        equity_curve,
        drawdown,
        bars_simulated: bars.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StrategyConfig, Threshold};
    use chrono::{Duration, NaiveDate};
    use std::collections::BTreeMap;

    fn synthetic_bars(n: usize) -> Vec<Bar> {
        // A slow oscillation so the mean-reversion bands actually trigger.
        let base = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.22).sin() * 15.0;
                Bar {
                    time: base + Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000.0,
                    indicators: BTreeMap::new(),
                }
            })
            .collect()
    }

    fn test_config() -> RunConfig {
        RunConfig {
            data: "unused.csv".into(),
            starting_capital: 10_000.0,
            tail: None,
            indicators: Default::default(),
            strategy: StrategyConfig::MeanReversion {
                oversold: Threshold(45.0),
                overbought: Threshold(55.0),
                require_profit: false,
                stop_loss_pct: None,
            },
        }
    }

    #[test]
    fn prepared_run_produces_consistent_outcome() {
        let outcome = run_prepared(synthetic_bars(400), &test_config()).unwrap();

        // Warm-up for the default stack (sma_50) drops 49 bars.
        assert_eq!(outcome.bars_simulated, 351);
        assert_eq!(outcome.equity_curve.len(), outcome.trades.len() + 1);
        assert_eq!(outcome.drawdown.len(), outcome.equity_curve.len());
        assert_eq!(
            outcome.analysis.final_capital,
            *outcome.equity_curve.last().unwrap()
        );
    }

    #[test]
    fn tail_restricts_the_simulated_range() {
        let config = RunConfig {
            tail: Some(100),
            ..test_config()
        };
        let outcome = run_prepared(synthetic_bars(400), &config).unwrap();
        assert_eq!(outcome.bars_simulated, 100);
    }

    #[test]
    fn too_short_series_fails_with_warmup_error() {
        let err = run_prepared(synthetic_bars(20), &test_config()).unwrap_err();
        assert!(err.to_string().contains("warm-up"));
    }

    #[test]
    fn zero_tail_is_rejected() {
        let config = RunConfig {
            tail: Some(0),
            ..test_config()
        };
        assert!(run_prepared(synthetic_bars(400), &config).is_err());
    }
}
