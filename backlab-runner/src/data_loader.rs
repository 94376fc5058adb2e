//! CSV bar loading.
//!
//! Bars arrive as a header-driven CSV with `time,open,high,low,close,volume`
//! columns (extra columns are ignored). Dates accept unpadded months and
//! days (`2021-3-5`). The loader only parses; series-level validation
//! (ordering, sane OHLCV) stays with the engine so every consumer gets the
//! same checks.

use backlab_core::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv record {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("csv record {row}: bad date {value:?}")]
    BadDate { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load bars from a CSV file on disk.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_bars(file)
}

/// Parse bars from any CSV reader.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, record) in csv_reader.deserialize::<CsvBar>().enumerate() {
        let row = i + 2; // 1-based, counting the header line
        let record = record.map_err(|source| LoadError::Csv { row, source })?;
        let time =
            NaiveDate::parse_from_str(&record.time, "%Y-%m-%d").map_err(|_| LoadError::BadDate {
                row,
                value: record.time.clone(),
            })?;
        bars.push(Bar {
            time,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
            indicators: BTreeMap::new(),
        });
    }
    Ok(bars)
}
