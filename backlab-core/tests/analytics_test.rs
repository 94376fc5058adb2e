//! Analytics over trade logs produced by the engine, end to end.

use backlab_core::analytics::{analyze, compute_drawdown, compute_equity_curve};
use backlab_core::domain::{Bar, ExitReason, Position, Trade};
use backlab_core::engine::backtest;
use backlab_core::strategy::{entry_fn, exit_fn, Strategy};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            time: base + Duration::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000.0,
            indicators: BTreeMap::new(),
        })
        .collect()
}

fn trade(profit: f64) -> Trade {
    Trade {
        entry_time: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
        entry_price: 100.0,
        exit_time: NaiveDate::from_ymd_opt(2021, 3, 2).unwrap(),
        exit_price: 100.0 + profit,
        profit,
        profit_pct: profit / 100.0,
        bars_held: 1,
        exit_reason: ExitReason::RuleExit,
    }
}

#[test]
fn engine_trade_log_reconciles_with_equity_curve() {
    // Two full round trips, then an entry on the final bar that gets
    // force-closed at the end of the series.
    let bars = make_bars(&[10.0, 8.0, 12.0, 9.0, 8.0, 12.0, 8.0]);
    let strategy = Strategy::new(
        entry_fn(|bar: &Bar| bar.close == 8.0),
        exit_fn(|bar: &Bar, _: &Position| bar.close == 12.0),
    );
    let trades = backtest(&strategy, &bars).unwrap();
    assert_eq!(trades.len(), 3);

    let capital = 10_000.0;
    let curve = compute_equity_curve(capital, &trades);
    assert_eq!(curve.len(), trades.len() + 1);
    assert_eq!(curve[0], capital);

    // Applying trade profits sequentially reproduces every curve point.
    let mut running = capital;
    for (i, t) in trades.iter().enumerate() {
        running += t.profit;
        assert_eq!(curve[i + 1], running);
    }

    let analysis = analyze(capital, &trades);
    assert_eq!(analysis.final_capital, *curve.last().unwrap());
    assert_eq!(
        analysis.total_profit,
        trades.iter().map(|t| t.profit).sum::<f64>()
    );
}

#[test]
fn drawdown_is_non_negative_and_zero_at_peaks() {
    let trades = vec![trade(50.0), trade(-30.0), trade(-10.0), trade(100.0)];
    let capital = 1_000.0;
    let equity = compute_equity_curve(capital, &trades);
    let drawdown = compute_drawdown(capital, &trades);

    assert_eq!(equity.len(), drawdown.len());
    assert_eq!(drawdown[0], 0.0);

    let mut peak = f64::MIN;
    for (i, &value) in equity.iter().enumerate() {
        assert!(drawdown[i] >= 0.0);
        if value > peak {
            peak = value;
            assert_eq!(drawdown[i], 0.0, "new peak at index {i} must have zero drawdown");
        }
    }
}

#[test]
fn analyze_zero_trades_is_well_defined() {
    let analysis = analyze(5_000.0, &[]);
    assert_eq!(analysis.total_trades, 0);
    assert_eq!(analysis.win_rate, 0.0);
    assert_eq!(analysis.avg_profit, 0.0);
    assert_eq!(analysis.profit_factor, 0.0);
    assert_eq!(analysis.max_drawdown, 0.0);
    assert_eq!(analysis.final_capital, 5_000.0);

    assert_eq!(compute_equity_curve(5_000.0, &[]), vec![5_000.0]);
    assert_eq!(compute_drawdown(5_000.0, &[]), vec![0.0]);
}

#[test]
fn max_drawdown_matches_drawdown_curve() {
    let trades = vec![trade(20.0), trade(-45.0), trade(5.0), trade(60.0), trade(-15.0)];
    let capital = 500.0;
    let analysis = analyze(capital, &trades);
    let drawdown = compute_drawdown(capital, &trades);
    let deepest = drawdown.iter().cloned().fold(0.0, f64::max);
    assert_eq!(analysis.max_drawdown, deepest);
}
