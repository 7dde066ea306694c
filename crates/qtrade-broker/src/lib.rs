//! qtrade-broker
//!
//! Broker abstraction ([`BrokerAdapter`]) and a deterministic paper-trading
//! implementation ([`PaperBroker`]) that fills orders against a bar stream.

mod adapter;
mod fill_rules;
mod paper;

pub use adapter::{BrokerAdapter, BrokerResult};
pub use fill_rules::{evaluate_trigger, partial_fill_quantity, FillRulesConfig};
pub use paper::PaperBroker;
