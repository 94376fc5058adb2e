//! Strategy — the bundle of entry, exit, and stop-loss rules.
//!
//! Rules are pure: they see the current bar and (for exit/stop rules) the
//! open position context, and nothing else. A rule must never mutate bar
//! data or carry state across calls; everything it needs about the open
//! trade is on the `Position` it receives each bar.

pub mod rules;

pub use rules::{
    AllOf, Cmp, FixedStop, IndicatorPair, IndicatorThreshold, MeanReversionEntry,
    MeanReversionExit, PercentStop,
};

use crate::domain::{Bar, Position};
use thiserror::Error;

/// Errors raised during rule evaluation.
///
/// Any rule error is terminal for the run: the engine surfaces it
/// immediately instead of treating the rule as "not triggered".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("indicator '{0}' not present on bar")]
    MissingIndicator(String),
}

/// Decides whether to open a position on the current bar.
pub trait EntryRule: Send + Sync {
    fn should_enter(&self, bar: &Bar) -> Result<bool, RuleError>;
}

/// Decides whether to close the open position against the bar's closing values.
pub trait ExitRule: Send + Sync {
    fn should_exit(&self, bar: &Bar, position: &Position) -> Result<bool, RuleError>;
}

/// Computes the stop level for the open position.
///
/// Re-evaluated every bar the position is open, so the level may be dynamic.
/// `None` means no stop is active this bar.
pub trait StopLossRule: Send + Sync {
    fn stop_level(&self, bar: &Bar, position: &Position) -> Result<Option<f64>, RuleError>;
}

/// Wrap a plain closure as an [`EntryRule`].
pub fn entry_fn<F>(f: F) -> FnEntry<F>
where
    F: Fn(&Bar) -> bool + Send + Sync,
{
    FnEntry(f)
}

/// Wrap a plain closure as an [`ExitRule`].
pub fn exit_fn<F>(f: F) -> FnExit<F>
where
    F: Fn(&Bar, &Position) -> bool + Send + Sync,
{
    FnExit(f)
}

/// Wrap a plain closure as a [`StopLossRule`].
pub fn stop_fn<F>(f: F) -> FnStop<F>
where
    F: Fn(&Bar, &Position) -> Option<f64> + Send + Sync,
{
    FnStop(f)
}

pub struct FnEntry<F>(F);
pub struct FnExit<F>(F);
pub struct FnStop<F>(F);

impl<F> EntryRule for FnEntry<F>
where
    F: Fn(&Bar) -> bool + Send + Sync,
{
    fn should_enter(&self, bar: &Bar) -> Result<bool, RuleError> {
        Ok((self.0)(bar))
    }
}

impl<F> ExitRule for FnExit<F>
where
    F: Fn(&Bar, &Position) -> bool + Send + Sync,
{
    fn should_exit(&self, bar: &Bar, position: &Position) -> Result<bool, RuleError> {
        Ok((self.0)(bar, position))
    }
}

impl<F> StopLossRule for FnStop<F>
where
    F: Fn(&Bar, &Position) -> Option<f64> + Send + Sync,
{
    fn stop_level(&self, bar: &Bar, position: &Position) -> Result<Option<f64>, RuleError> {
        Ok((self.0)(bar, position))
    }
}

/// A complete strategy: entry rule, exit rule, optional stop-loss.
///
/// Entry and exit are required by construction, so a strategy with a
/// missing rule is unrepresentable here; the config layer reports its own
/// error before ever building one.
pub struct Strategy {
    pub entry: Box<dyn EntryRule>,
    pub exit: Box<dyn ExitRule>,
    pub stop_loss: Option<Box<dyn StopLossRule>>,
}

impl Strategy {
    pub fn new(entry: impl EntryRule + 'static, exit: impl ExitRule + 'static) -> Self {
        Self {
            entry: Box::new(entry),
            exit: Box::new(exit),
            stop_loss: None,
        }
    }

    pub fn with_stop_loss(mut self, stop: impl StopLossRule + 'static) -> Self {
        self.stop_loss = Some(Box::new(stop));
        self
    }
}
