//! qtrade-types
//!
//! Immutable market-data and order-intent value types: [`Bar`], [`Order`],
//! [`ExecutionReport`], [`Position`]. Pure data + fallible constructors; no
//! IO, no broker wiring.

mod bar;
mod order;
mod position;

pub use bar::Bar;
pub use bar::ValidationError as BarValidationError;
pub use order::{client_order_id, ExecutionReport, Order, OverfillError, Side};
pub use order::{OrderKind, ValidationError as OrderValidationError};
pub use position::Position;
