//! Action space and position-sign-aware action filtering.

use qtrade_core::Micros;
use serde::{Deserialize, Serialize};

/// The five actions the agent may select. `Buy`/`Sell` open a position from
/// flat; `Increase`/`Decrease` add to or trim an already-open position in
/// its existing direction. `Hold` is always allowed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Hold,
    Buy,
    Sell,
    Increase,
    Decrease,
}

/// Fixed action ordering used both for the Q-table's per-state array layout
/// and as the deterministic argmax tie-break order.
pub const ALL_ACTIONS: [Action; 5] = [
    Action::Hold,
    Action::Buy,
    Action::Sell,
    Action::Increase,
    Action::Decrease,
];

impl Action {
    pub fn index(self) -> usize {
        match self {
            Action::Hold => 0,
            Action::Buy => 1,
            Action::Sell => 2,
            Action::Increase => 3,
            Action::Decrease => 4,
        }
    }
}

/// The actions permitted given the current signed position quantity for a
/// symbol (flat / long / short), in deterministic tie-break order.
pub fn allowed_actions(current_position_quantity: Micros) -> Vec<Action> {
    if current_position_quantity.is_zero() {
        vec![Action::Hold, Action::Buy, Action::Sell]
    } else {
        vec![Action::Hold, Action::Increase, Action::Decrease]
    }
}
