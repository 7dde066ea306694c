//! qtrade-pipeline
//!
//! The per-symbol decision pipeline wiring the aggregator, pattern checks,
//! Q-agent, risk engine, idempotency tracker, and broker adapter into one
//! call: [`run_decision_pipeline`].

mod config;
mod decision;
mod features;
mod outcome;

pub use config::PipelineConfig;
pub use decision::{run_decision_pipeline, PositionContext};
pub use features::{cross_timeframe_agreement, extract as extract_features, primary_trend_sign};
pub use outcome::{NoActionReason, PipelineOutcome};
