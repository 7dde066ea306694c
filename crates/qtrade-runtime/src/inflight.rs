//! The order-submission-time map: tracks orders between submission and
//! their terminal fill. Guarded by its own mutex per the lock order in
//! spec §5 (Portfolio → Risk → Aggregator → QTable → submission-time map →
//! Idempotency).

use std::collections::HashMap;
use std::sync::Mutex;

use qtrade_agent::{Action, StateKey};
use qtrade_core::{Micros, UtcInstant};

/// What the coordinator needs to remember about one order it submitted,
/// between submission and its terminal fill: the Q-agent inputs that
/// produced it (for the eventual learning update) and its ordered quantity
/// (for overfill detection against cumulative fills).
#[derive(Clone, Debug)]
pub struct InFlightOrder {
    pub symbol: String,
    pub state: StateKey,
    pub action: Action,
    pub ordered_quantity: Micros,
    pub cumulative_filled: Micros,
    pub submitted_at: UtcInstant,
}

#[derive(Default)]
pub struct InFlightOrders {
    orders: Mutex<HashMap<String, InFlightOrder>>,
}

impl InFlightOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, client_order_id: String, order: InFlightOrder) {
        self.orders
            .lock()
            .expect("in-flight orders mutex poisoned")
            .insert(client_order_id, order);
    }

    /// Records `filled_quantity` against the order's running total. Returns
    /// `Err` with the order's ordered/cumulative quantities if this fill
    /// would push cumulative fills past what was ordered — a fatal overfill.
    /// On a clean, terminal fill (cumulative reaches the ordered quantity)
    /// the entry is removed and the stored state/action are returned for
    /// the Q-learning update; on a clean partial fill the entry is kept and
    /// the state/action are returned as well.
    pub fn record_fill(
        &self,
        client_order_id: &str,
        filled_quantity: Micros,
    ) -> Option<Result<(StateKey, Action), (Micros, Micros)>> {
        let mut orders = self.orders.lock().expect("in-flight orders mutex poisoned");
        let order = orders.get_mut(client_order_id)?;
        let cumulative = order.cumulative_filled.saturating_add(filled_quantity);
        if cumulative.raw() > order.ordered_quantity.raw() {
            return Some(Err((order.ordered_quantity, cumulative)));
        }
        order.cumulative_filled = cumulative;
        let state_action = (order.state, order.action);
        if cumulative >= order.ordered_quantity {
            orders.remove(client_order_id);
        }
        Some(Ok(state_action))
    }

    pub fn len(&self) -> usize {
        self.orders.lock().expect("in-flight orders mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
