//! Backlab Runner — orchestration around the core engine.
//!
//! The runner owns everything the core deliberately does not: TOML run
//! configuration, CSV bar loading, report rendering, artifact export, and
//! rayon-parallel parameter sweeps. Each backtest run is fully independent,
//! so sweeps share nothing but a read-only view of the raw bars.

pub mod config;
pub mod data_loader;
pub mod report;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, IndicatorConfig, RunConfig, StrategyConfig, Threshold};
pub use data_loader::{load_bars_csv, LoadError};
pub use report::{render_analysis_table, write_analysis_json, write_curve_csv, write_trades_csv};
pub use runner::{run_from_config, run_prepared, RunOutcome};
pub use sweep::{render_sweep_table, run_sweep, SweepGrid, SweepRow};
