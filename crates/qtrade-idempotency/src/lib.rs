//! qtrade-idempotency
//!
//! TTL-based `client_order_id` deduplication with atomic on-disk
//! persistence. See [`IdempotencyTracker`].

mod error;
mod tracker;
mod types;

pub use error::IdempotencyError;
pub use tracker::IdempotencyTracker;
pub use types::IdempotencySnapshot;
