//! What a single [`crate::run_decision_pipeline`] call produced.

use qtrade_agent::{Action, StateKey};
use qtrade_risk::RejectionReason;
use qtrade_types::Order;

/// Why the pipeline took no trading action, in the order the corresponding
/// check runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoActionReason {
    InsufficientHistory,
    Blocked,
    LowConfidence,
    BelowMinimumQuantity,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PipelineOutcome {
    NoAction(NoActionReason),
    /// The candidate order's `client_order_id` was already marked
    /// submitted within the idempotency TTL; the retry was silently
    /// dropped.
    Duplicate,
    Rejected(RejectionReason),
    /// A new order reached the broker. `state`/`action` are the Q-agent
    /// inputs that produced it, carried through so the caller can key a
    /// learning update to the fill(s) this order eventually produces.
    Submitted {
        order_id: String,
        order: Order,
        state: StateKey,
        action: Action,
    },
    /// The broker adapter returned an error from `submit`. No idempotency
    /// record was written and no rate-limit slot was consumed.
    SubmissionFailed(String),
}

impl PipelineOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, PipelineOutcome::Submitted { .. })
    }
}
