//! qtrade-lifecycle
//!
//! Manual stop requests ([`StopController`]), the graceful-shutdown
//! sequence ([`run_graceful_shutdown`]), and the EOD flatten trigger
//! ([`EodFlattenSchedule`]).

mod eod;
mod shutdown;
mod stop;

pub use eod::{EodFlattenSchedule, SessionCalendar};
pub use shutdown::{run_graceful_shutdown, ShutdownConfig, ShutdownReport, ShutdownStatus, SymbolOutcome};
pub use stop::{StopController, StopReason};
