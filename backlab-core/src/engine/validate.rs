//! Pre-walk input validation.
//!
//! A malformed series is a fatal input error surfaced before the simulation
//! starts, not discovered mid-walk.

use crate::domain::Bar;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("bar series is empty")]
    EmptySeries,

    #[error("bar {index} ({time}) has malformed OHLCV values")]
    MalformedBar { index: usize, time: NaiveDate },

    #[error("bar {index} ({time}) does not strictly follow the previous bar ({previous})")]
    NonIncreasingTime {
        index: usize,
        time: NaiveDate,
        previous: NaiveDate,
    },
}

/// Validate the whole series: non-empty, sane OHLCV on every bar, strictly
/// increasing timestamps (no duplicates).
pub fn validate_bars(bars: &[Bar]) -> Result<(), ValidationError> {
    if bars.is_empty() {
        return Err(ValidationError::EmptySeries);
    }

    for (index, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(ValidationError::MalformedBar {
                index,
                time: bar.time,
            });
        }
        if index > 0 {
            let previous = bars[index - 1].time;
            if bar.time <= previous {
                return Err(ValidationError::NonIncreasingTime {
                    index,
                    time: bar.time,
                    previous,
                });
            }
        }
    }

    Ok(())
}
