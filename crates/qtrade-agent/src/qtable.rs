//! Bounded Q-table with write-only-touch LRU eviction.
//!
//! Reads (`q_values`) never change an entry's recency — only a learning
//! update moves it to the most-recently-used end. This keeps a
//! frequently-*read*-but-rarely-*updated* state (one the agent keeps
//! observing but isn't learning anything new about) from crowding out
//! states that are actually being trained.
//!
//! Recency is tracked with a monotonic logical clock plus a `BTreeMap`
//! ordered by that clock — the smallest key is always the least-recently
//! touched entry, giving O(log n) touch and eviction without a doubly
//! linked list.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::state::StateKey;

pub struct QTable {
    max_states: usize,
    values: HashMap<StateKey, [f64; 5]>,
    recency: HashMap<StateKey, u64>,
    order: BTreeMap<u64, StateKey>,
    clock: u64,
}

/// A single persisted Q-table entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QTableEntry {
    pub state: StateKey,
    pub values: [f64; 5],
    pub recency: u64,
}

impl QTable {
    pub fn new(max_states: usize) -> Self {
        Self {
            max_states,
            values: HashMap::new(),
            recency: HashMap::new(),
            order: BTreeMap::new(),
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Q-values for every action at `state`, zero for unseen `(state, action)`
    /// pairs. Does not affect recency.
    pub fn q_values(&self, state: &StateKey) -> [f64; 5] {
        self.values.get(state).copied().unwrap_or([0.0; 5])
    }

    /// Among `allowed`, the action with the highest Q-value at `state` and
    /// its value, plus the second-best value (for confidence scoring).
    /// Ties break on [`ALL_ACTIONS`] order. Does not affect recency.
    pub fn best_action(&self, state: &StateKey, allowed: &[Action]) -> (Action, f64, f64) {
        let row = self.q_values(state);
        let mut best = (allowed[0], row[allowed[0].index()]);
        let mut second_best = f64::NEG_INFINITY;
        for &action in allowed.iter().skip(1) {
            let value = row[action.index()];
            if value > best.1 {
                second_best = second_best.max(best.1);
                best = (action, value);
            } else {
                second_best = second_best.max(value);
            }
        }
        (best.0, best.1, second_best)
    }

    /// Bellman update: `Q(s,a) <- Q(s,a) + alpha*(reward + gamma*max_next - Q(s,a))`.
    /// `max_next` is the caller-supplied `max_a' Q(s',a')` term (a read, so
    /// it must not itself touch the next state's recency — callers should
    /// obtain it via `best_action` on the next state before calling this).
    /// Touches `state`, moving it to the most-recently-used position, and
    /// evicts the least-recently-touched entry if this insert grows the
    /// table past `max_states`.
    pub fn update(&mut self, state: StateKey, action: Action, reward: f64, gamma: f64, max_next: f64, alpha: f64) {
        let row = self.values.entry(state).or_insert([0.0; 5]);
        let idx = action.index();
        let td_target = reward + gamma * max_next;
        row[idx] += alpha * (td_target - row[idx]);
        self.touch(state);
        self.evict_if_needed();
    }

    fn touch(&mut self, state: StateKey) {
        if let Some(old_clock) = self.recency.remove(&state) {
            self.order.remove(&old_clock);
        }
        self.clock += 1;
        self.recency.insert(state, self.clock);
        self.order.insert(self.clock, state);
    }

    fn evict_if_needed(&mut self) {
        while self.values.len() > self.max_states {
            let Some((&oldest_clock, &oldest_state)) = self.order.iter().next() else {
                break;
            };
            self.order.remove(&oldest_clock);
            self.recency.remove(&oldest_state);
            self.values.remove(&oldest_state);
        }
    }

    /// Multiplies every Q-value by `(1 - lambda)`, de-emphasizing stale
    /// regime learning. Does not affect recency ordering.
    pub fn decay(&mut self, lambda: f64) {
        if lambda <= 0.0 {
            return;
        }
        let factor = 1.0 - lambda;
        for row in self.values.values_mut() {
            for v in row.iter_mut() {
                *v *= factor;
            }
        }
    }

    pub fn to_entries(&self) -> Vec<QTableEntry> {
        self.values
            .iter()
            .map(|(state, values)| QTableEntry {
                state: *state,
                values: *values,
                recency: *self.recency.get(state).unwrap_or(&0),
            })
            .collect()
    }

    pub fn from_entries(max_states: usize, entries: Vec<QTableEntry>) -> Self {
        let mut table = QTable::new(max_states);
        for entry in entries {
            table.values.insert(entry.state, entry.values);
            table.recency.insert(entry.state, entry.recency);
            table.order.insert(entry.recency, entry.state);
            table.clock = table.clock.max(entry.recency);
        }
        table
    }
}

/// Deterministic argmax over a fixed action row, used by callers that
/// already have a raw `[f64; 5]` (e.g. after `q_values`) rather than going
/// through `QTable::best_action`.
pub fn argmax(row: [f64; 5], allowed: &[Action]) -> Action {
    let mut best = allowed[0];
    let mut best_value = row[best.index()];
    for &action in &allowed[1..] {
        let value = row[action.index()];
        if value > best_value {
            best = action;
            best_value = value;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Trend, Volatility};

    fn state(bin: u8) -> StateKey {
        StateKey {
            price_change_bin: bin,
            volume_ratio_bin: 0,
            trend: Trend::Flat,
            volatility: Volatility::Normal,
            position_bin: 0,
        }
    }

    #[test]
    fn unseen_state_has_zero_q_values() {
        let table = QTable::new(10);
        assert_eq!(table.q_values(&state(0)), [0.0; 5]);
    }

    #[test]
    fn update_moves_entry_to_most_recent_and_reads_do_not() {
        let mut table = QTable::new(2);
        table.update(state(0), Action::Buy, 1.0, 0.9, 0.0, 0.5);
        table.update(state(1), Action::Buy, 1.0, 0.9, 0.0, 0.5);
        // Reading state(0) must not protect it from eviction.
        let _ = table.q_values(&state(0));
        table.update(state(2), Action::Buy, 1.0, 0.9, 0.0, 0.5);

        assert_eq!(table.len(), 2);
        assert_eq!(table.q_values(&state(0)), [0.0; 5]);
    }

    #[test]
    fn decay_shrinks_all_values_toward_zero() {
        let mut table = QTable::new(10);
        table.update(state(0), Action::Buy, 10.0, 0.9, 0.0, 1.0);
        let before = table.q_values(&state(0))[Action::Buy.index()];
        table.decay(0.1);
        let after = table.q_values(&state(0))[Action::Buy.index()];
        assert!((after - before * 0.9).abs() < 1e-9);
    }
}
