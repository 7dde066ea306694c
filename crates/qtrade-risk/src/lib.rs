//! qtrade-risk
//!
//! Layered pre-trade risk controls and the halt state machine: [`RiskEngine`]
//! wraps the ordered checks in [`engine::evaluate`] behind a mutex-guarded
//! facade.

mod engine;
mod facade;
mod state;
mod types;

pub use engine::{evaluate, register_trade};
pub use facade::RiskEngine;
pub use state::RiskState;
pub use types::{HaltReason, PreTradeInput, RejectionReason, RiskConfig, RiskDecision};
