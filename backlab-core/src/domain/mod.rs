//! Domain types: bars, positions, trades.

pub mod bar;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use position::Position;
pub use trade::{ExitReason, Trade};
