//! Broker abstraction trait.
//!
//! Fallible methods return a boxed `std::error::Error`, not a
//! crate-specific error enum, since an external broker's failure modes are
//! outside this workspace's control.

use std::collections::BTreeMap;
use std::time::Duration;

use qtrade_core::Micros;
use qtrade_types::{ExecutionReport, Order};

pub type BrokerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common contract every broker integration (paper or live) implements.
pub trait BrokerAdapter: Send + Sync {
    fn start(&self) -> BrokerResult<()>;
    fn stop(&self) -> BrokerResult<()>;

    /// Submit an order, returning the broker-assigned order id. Must be
    /// idempotent on `client_order_id`: a retried submission within the
    /// broker's own de-duplication window returns the same id rather than
    /// creating a second order.
    fn submit(&self, order: &Order) -> BrokerResult<String>;
    fn cancel(&self, order_id: &str) -> BrokerResult<()>;
    fn cancel_all_orders(&self) -> BrokerResult<()>;

    /// Authoritative signed position quantity per symbol, as the broker
    /// currently sees it.
    fn reconcile_positions(&self, timeout: Duration) -> BrokerResult<BTreeMap<String, Micros>>;
}
