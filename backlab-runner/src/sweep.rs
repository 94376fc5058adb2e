//! Parameter sweep over the mean-reversion strategy family.
//!
//! Each grid point is a fully independent run: it gets its own copy of the
//! raw bars, its own indicator columns, and its own trade log, so the grid
//! executes with rayon without any shared mutable state.

use anyhow::Result;
use backlab_core::analytics::Analysis;
use backlab_core::domain::Bar;
use rayon::prelude::*;

use crate::config::{RunConfig, StrategyConfig, Threshold};
use crate::runner::run_prepared;

/// Grid of mean-reversion parameters to explore.
#[derive(Debug, Clone)]
pub struct SweepGrid {
    pub fast_ema_periods: Vec<usize>,
    pub slow_sma_periods: Vec<usize>,
    pub oversold_levels: Vec<f64>,
    pub overbought_levels: Vec<f64>,
}

impl SweepGrid {
    /// A modest default grid around the usual mean-reversion settings.
    pub fn default_grid() -> Self {
        Self {
            fast_ema_periods: vec![5, 9, 12],
            slow_sma_periods: vec![20, 50, 100],
            oversold_levels: vec![20.0, 30.0, 40.0],
            overbought_levels: vec![60.0, 70.0, 80.0],
        }
    }

    /// Upper bound on grid size (before invalid fast/slow combos are skipped).
    pub fn size(&self) -> usize {
        self.fast_ema_periods.len()
            * self.slow_sma_periods.len()
            * self.oversold_levels.len()
            * self.overbought_levels.len()
    }

    /// Generate one config per valid grid point, based on `base` for data
    /// path, capital, tail, and RSI period.
    pub fn generate_configs(&self, base: &RunConfig) -> Vec<RunConfig> {
        let mut configs = Vec::new();
        for &fast in &self.fast_ema_periods {
            for &slow in &self.slow_sma_periods {
                if fast >= slow {
                    continue;
                }
                for &oversold in &self.oversold_levels {
                    for &overbought in &self.overbought_levels {
                        if oversold >= overbought {
                            continue;
                        }
                        let mut config = base.clone();
                        config.indicators.fast_ema = fast;
                        config.indicators.slow_sma = slow;
                        config.strategy = StrategyConfig::MeanReversion {
                            oversold: Threshold(oversold),
                            overbought: Threshold(overbought),
                            require_profit: true,
                            stop_loss_pct: None,
                        };
                        configs.push(config);
                    }
                }
            }
        }
        configs
    }
}

/// One ranked sweep result.
#[derive(Debug, Clone)]
pub struct SweepRow {
    pub fast_ema: usize,
    pub slow_sma: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub analysis: Analysis,
}

/// Run every grid point in parallel and rank by total profit, best first.
///
/// A failure in any single run (for instance a series too short for the
/// largest slow period) fails the sweep; partial leaderboards would hide
/// broken grid points.
pub fn run_sweep(bars: &[Bar], base: &RunConfig, grid: &SweepGrid) -> Result<Vec<SweepRow>> {
    let configs = grid.generate_configs(base);

    let mut rows: Vec<SweepRow> = configs
        .par_iter()
        .map(|config| {
            let outcome = run_prepared(bars.to_vec(), config)?;
            let (fast_ema, slow_sma) = (config.indicators.fast_ema, config.indicators.slow_sma);
            let (oversold, overbought) = match &config.strategy {
                StrategyConfig::MeanReversion {
                    oversold,
                    overbought,
                    ..
                } => (oversold.0, overbought.0),
                _ => unreachable!("sweep only generates mean-reversion configs"),
            };
            Ok(SweepRow {
                fast_ema,
                slow_sma,
                oversold,
                overbought,
                analysis: outcome.analysis,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    rows.sort_by(|a, b| {
        b.analysis
            .total_profit
            .partial_cmp(&a.analysis.total_profit)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(rows)
}

/// Render sweep rows as an aligned leaderboard table.
pub fn render_sweep_table(rows: &[SweepRow], top: usize) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<6} {:<9} {:<11} {:>8} {:>12} {:>10}",
        "fast", "slow", "oversold", "overbought", "trades", "profit", "win_rate"
    );
    for row in rows.iter().take(top) {
        let _ = writeln!(
            out,
            "{:<6} {:<6} {:<9} {:<11} {:>8} {:>12.2} {:>9.1}%",
            row.fast_ema,
            row.slow_sma,
            row.oversold,
            row.overbought,
            row.analysis.total_trades,
            row.analysis.total_profit,
            row.analysis.win_rate * 100.0
        );
    }
    out
}
