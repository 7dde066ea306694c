//! qtrade-agent
//!
//! The Q-learning decision agent (internally "FSD"): state discretization
//! ([`state`]), epsilon-greedy action selection with confidence scoring and
//! position sizing, and the bounded, write-only-touch-LRU [`QTable`] behind
//! [`FsdAgent`].

mod action;
mod agent;
mod confidence;
mod error;
mod qtable;
mod sizing;
mod state;

pub use action::{allowed_actions, Action, ALL_ACTIONS};
pub use agent::{AgentConfig, Decision, FsdAgent};
pub use confidence::{score as confidence_score, ConfidenceInputs};
pub use error::AgentError;
pub use qtable::{argmax, QTable, QTableEntry};
pub use sizing::{target_quantity, SizingInputs};
pub use state::{FeatureInputs, StateKey, Trend, Volatility};
