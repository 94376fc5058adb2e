//! Backlab CLI — run and sweep commands.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config, print the analysis
//!   table, and write trade/equity/drawdown artifacts
//! - `sweep` — explore a mean-reversion parameter grid in parallel and
//!   print the leaderboard

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use backlab_runner::sweep::render_sweep_table;
use backlab_runner::{
    load_bars_csv, run_from_config, run_sweep, write_analysis_json, write_curve_csv,
    write_trades_csv, RunConfig, SweepGrid,
};

#[derive(Parser)]
#[command(name = "backlab", about = "Backlab — single-asset backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one backtest from a TOML config file.
    Run {
        /// Path to the TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Directory for trades/equity/drawdown/analysis artifacts.
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Skip writing artifacts; only print the analysis table.
        #[arg(long, default_value_t = false)]
        no_artifacts: bool,
    },
    /// Run a mean-reversion parameter sweep and print the leaderboard.
    Sweep {
        /// Path to the TOML run config (data path, capital, RSI period).
        #[arg(long)]
        config: PathBuf,

        /// Fast EMA periods to test (defaults to 5 9 12).
        #[arg(long, num_args = 1..)]
        fast: Vec<usize>,

        /// Slow SMA periods to test (defaults to 20 50 100).
        #[arg(long, num_args = 1..)]
        slow: Vec<usize>,

        /// Leaderboard rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            output_dir,
            no_artifacts,
        } => cmd_run(&config, &output_dir, no_artifacts),
        Commands::Sweep {
            config,
            fast,
            slow,
            top,
        } => cmd_sweep(&config, fast, slow, top),
    }
}

fn cmd_run(config_path: &PathBuf, output_dir: &PathBuf, no_artifacts: bool) -> Result<()> {
    let config = RunConfig::from_toml_path(config_path)?;
    let outcome = run_from_config(&config)?;

    println!(
        "Simulated {} bars, {} trades.",
        outcome.bars_simulated,
        outcome.trades.len()
    );
    println!();
    print!("{}", backlab_runner::render_analysis_table(&outcome.analysis));

    if no_artifacts {
        return Ok(());
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output dir {}", output_dir.display()))?;
    write_trades_csv(&output_dir.join("trades.csv"), &outcome.trades)?;
    write_curve_csv(&output_dir.join("equity.csv"), "equity", &outcome.equity_curve)?;
    write_curve_csv(&output_dir.join("drawdown.csv"), "drawdown", &outcome.drawdown)?;
    write_analysis_json(&output_dir.join("analysis.json"), &outcome.analysis)?;
    println!();
    println!(">> {}", output_dir.display());
    Ok(())
}

fn cmd_sweep(config_path: &PathBuf, fast: Vec<usize>, slow: Vec<usize>, top: usize) -> Result<()> {
    if top == 0 {
        bail!("--top must be at least 1");
    }

    let config = RunConfig::from_toml_path(config_path)?;
    let bars = load_bars_csv(&config.data)
        .with_context(|| format!("loading bars from {}", config.data.display()))?;

    let mut grid = SweepGrid::default_grid();
    if !fast.is_empty() {
        grid.fast_ema_periods = fast;
    }
    if !slow.is_empty() {
        grid.slow_sma_periods = slow;
    }

    let rows = run_sweep(&bars, &config, &grid)?;
    println!(
        "Swept {} configurations over {} bars.",
        rows.len(),
        bars.len()
    );
    println!();
    print!("{}", render_sweep_table(&rows, top));
    Ok(())
}
