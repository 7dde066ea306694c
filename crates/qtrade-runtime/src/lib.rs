//! qtrade-runtime
//!
//! The session coordinator: wires the decision pipeline, portfolio ledger,
//! risk engine, checkpointing, reconciliation, capital management, and
//! graceful shutdown into one per-session lifecycle. See [`Coordinator`].

mod config;
mod coordinator;
mod error;
mod inflight;
mod state;

pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, CoordinatorDeps};
pub use error::CoordinatorError;
pub use inflight::{InFlightOrder, InFlightOrders};
pub use state::CoordinatorState;
