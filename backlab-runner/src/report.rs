//! Report rendering and artifact export.
//!
//! The analysis table is plain monospaced text; artifacts are CSV/JSON
//! files the way downstream tooling expects them.

use anyhow::{Context, Result};
use backlab_core::analytics::Analysis;
use backlab_core::domain::{ExitReason, Trade};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Render the analysis as an aligned metric/value table.
pub fn render_analysis_table(analysis: &Analysis) -> String {
    let rows: Vec<(&str, String)> = vec![
        ("starting_capital", format!("{:.2}", analysis.starting_capital)),
        ("final_capital", format!("{:.2}", analysis.final_capital)),
        ("total_trades", analysis.total_trades.to_string()),
        ("winning_trades", analysis.winning_trades.to_string()),
        ("losing_trades", analysis.losing_trades.to_string()),
        ("win_rate", format!("{:.2}%", analysis.win_rate * 100.0)),
        ("total_profit", format!("{:.2}", analysis.total_profit)),
        ("avg_profit", format!("{:.2}", analysis.avg_profit)),
        ("avg_win", format!("{:.2}", analysis.avg_win)),
        ("avg_loss", format!("{:.2}", analysis.avg_loss)),
        ("largest_win", format!("{:.2}", analysis.largest_win)),
        ("largest_loss", format!("{:.2}", analysis.largest_loss)),
        ("profit_factor", format!("{:.2}", analysis.profit_factor)),
        ("max_drawdown", format!("{:.2}", analysis.max_drawdown)),
        (
            "max_drawdown_pct",
            format!("{:.2}%", analysis.max_drawdown_pct * 100.0),
        ),
        ("avg_bars_held", format!("{:.1}", analysis.avg_bars_held)),
    ];

    let name_width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "{:<name_width$}  Value", "Metric");
    let _ = writeln!(out, "{:-<name_width$}  -----", "");
    for (name, value) in rows {
        let _ = writeln!(out, "{name:<name_width$}  {value}");
    }
    out
}

fn exit_reason_label(reason: ExitReason) -> &'static str {
    match reason {
        ExitReason::RuleExit => "rule_exit",
        ExitReason::StopLoss => "stop_loss",
        ExitReason::EndOfSeries => "end_of_series",
    }
}

pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    writeln!(
        file,
        "entry_time,entry_price,exit_time,exit_price,profit,profit_pct,bars_held,exit_reason"
    )?;
    for trade in trades {
        writeln!(
            file,
            "{},{:.4},{},{:.4},{:.4},{:.6},{},{}",
            trade.entry_time,
            trade.entry_price,
            trade.exit_time,
            trade.exit_price,
            trade.profit,
            trade.profit_pct,
            trade.bars_held,
            exit_reason_label(trade.exit_reason)
        )?;
    }
    Ok(())
}

/// Write a one-value-per-line curve (equity or drawdown) as `index,<label>`.
pub fn write_curve_csv(path: &Path, label: &str, curve: &[f64]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create curve CSV {}", path.display()))?;
    writeln!(file, "index,{label}")?;
    for (i, value) in curve.iter().enumerate() {
        writeln!(file, "{i},{value:.4}")?;
    }
    Ok(())
}

pub fn write_analysis_json(path: &Path, analysis: &Analysis) -> Result<()> {
    let json = serde_json::to_string_pretty(analysis).context("failed to serialize analysis")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write analysis JSON {}", path.display()))?;
    Ok(())
}
