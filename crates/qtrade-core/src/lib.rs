//! qtrade-core
//!
//! Exact decimal money (`Micros`) and UTC-aware time primitives shared by
//! every other crate in the workspace, plus the atomic temp-file+rename
//! write sequence used by the checkpoint manager and idempotency tracker.
//!
//! Pure, deterministic, no IO except `atomic_file` (which is explicit,
//! synchronous, and confined to its own module).

mod atomic_file;
mod fixedpoint;
mod time;

pub use atomic_file::{read_if_exists, write_atomic};
pub use fixedpoint::{Micros, MICROS_SCALE};
pub use time::{utc_date_advanced, NaiveTimestampRejected, UtcInstant};
