//! qtrade-aggregator
//!
//! Rolls base-interval bars up into configured higher timeframes behind a
//! mutex-guarded facade: [`Aggregator`].

mod aggregator;
mod buffer;
mod timeframe;

pub use aggregator::Aggregator;
pub use timeframe::Timeframe;
