//! The Q-learning decision agent (FSD): epsilon-greedy action selection,
//! confidence scoring, position sizing, and the Bellman learning update,
//! behind a mutex-guarded facade.

use std::path::Path;
use std::sync::Mutex;

use qtrade_core::Micros;
use qtrade_patterns::Severity;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::{allowed_actions, Action};
use crate::confidence::{self, ConfidenceInputs};
use crate::error::AgentError;
use crate::qtable::{QTable, QTableEntry};
use crate::sizing::{self, SizingInputs};
use crate::state::StateKey;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
    pub epsilon_start: f64,
    pub epsilon_min: f64,
    pub epsilon_decay_rate: f64,
    pub alpha: f64,
    pub gamma: f64,
    pub max_states: usize,
    /// `0.0` disables decay entirely; the default absent an explicit
    /// `q_decay` configuration value.
    pub q_decay_lambda: f64,
    pub base_size_fraction: f64,
    pub max_position_pct: f64,
    pub min_confidence_threshold: f64,
    pub risk_penalty: f64,
    pub transaction_cost: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            epsilon_start: 1.0,
            epsilon_min: 0.05,
            epsilon_decay_rate: 0.995,
            alpha: 0.1,
            gamma: 0.95,
            max_states: 200_000,
            q_decay_lambda: 0.0,
            base_size_fraction: 0.1,
            max_position_pct: 0.25,
            min_confidence_threshold: 0.55,
            risk_penalty: 0.0005,
            transaction_cost: 0.0005,
        }
    }
}

/// The outcome of one `decide` call.
#[derive(Clone, Debug)]
pub struct Decision {
    pub action: Action,
    pub confidence: f64,
    pub target_quantity: Micros,
}

/// On-disk persisted shape: Q-table entries, epsilon, and session counters.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct PersistedState {
    entries: Vec<QTableEntry>,
    epsilon: f64,
    episodes_observed: u64,
}

pub struct FsdAgent {
    cfg: AgentConfig,
    qtable: Mutex<QTable>,
    epsilon: Mutex<f64>,
    episodes_observed: Mutex<u64>,
}

impl FsdAgent {
    pub fn new(cfg: AgentConfig) -> Self {
        let epsilon = cfg.epsilon_start;
        let max_states = cfg.max_states;
        Self {
            cfg,
            qtable: Mutex::new(QTable::new(max_states)),
            epsilon: Mutex::new(epsilon),
            episodes_observed: Mutex::new(0),
        }
    }

    /// Epsilon-greedy action selection, confidence scoring, and position
    /// sizing in one call. `current_position_quantity` determines the
    /// allowed action set; `equity`/`price`/`multiplier` feed sizing.
    #[allow(clippy::too_many_arguments)]
    pub fn decide(
        &self,
        state: &StateKey,
        current_position_quantity: Micros,
        severity: Severity,
        pattern_signal_agrees: bool,
        cross_timeframe_agreement: f64,
        equity: Micros,
        price: Micros,
        multiplier: i64,
        broker_min_notional: Micros,
    ) -> Decision {
        let allowed = allowed_actions(current_position_quantity);
        let qtable = self.qtable.lock().expect("qtable mutex poisoned");

        let epsilon = *self.epsilon.lock().expect("epsilon mutex poisoned");
        let (action, best_q, second_best_q) = if rand::thread_rng().gen::<f64>() < epsilon {
            let idx = rand::thread_rng().gen_range(0..allowed.len());
            let picked = allowed[idx];
            let row = qtable.q_values(state);
            (picked, row[picked.index()], f64::NEG_INFINITY)
        } else {
            qtable.best_action(state, &allowed)
        };
        drop(qtable);

        let gap = if second_best_q.is_finite() {
            best_q - second_best_q
        } else {
            best_q.max(0.0)
        };

        let confidence = confidence::score(&ConfidenceInputs {
            q_value_gap: gap,
            severity,
            pattern_signal_agrees,
            cross_timeframe_agreement,
        });

        let target_quantity = if confidence >= self.cfg.min_confidence_threshold && !severity.is_blocked() {
            sizing::target_quantity(&SizingInputs {
                equity,
                base_size_fraction: self.cfg.base_size_fraction,
                confidence,
                severity_scale: severity.size_multiplier(),
                max_position_pct: self.cfg.max_position_pct,
                broker_min_notional,
                price,
                multiplier,
            })
        } else {
            Micros::ZERO
        };

        Decision {
            action,
            confidence,
            target_quantity,
        }
    }

    /// Bellman update on a fill: `reward = realized_pnl - risk_penalty *
    /// |position_notional| - transaction_cost * |position_notional|`.
    pub fn learn(
        &self,
        state: StateKey,
        action: Action,
        realized_pnl: Micros,
        position_notional: Micros,
        next_state: &StateKey,
        next_allowed: &[Action],
    ) {
        let reward = realized_pnl.to_f64()
            - self.cfg.risk_penalty * position_notional.abs().to_f64()
            - self.cfg.transaction_cost * position_notional.abs().to_f64();

        let mut qtable = self.qtable.lock().expect("qtable mutex poisoned");
        let (_, max_next, _) = qtable.best_action(next_state, next_allowed);
        qtable.update(state, action, reward, self.cfg.gamma, max_next, self.cfg.alpha);
        drop(qtable);

        *self.episodes_observed.lock().expect("episodes mutex poisoned") += 1;
        self.decay_epsilon();
        if self.cfg.q_decay_lambda > 0.0 {
            self.qtable
                .lock()
                .expect("qtable mutex poisoned")
                .decay(self.cfg.q_decay_lambda);
        }
    }

    fn decay_epsilon(&self) {
        let mut epsilon = self.epsilon.lock().expect("epsilon mutex poisoned");
        *epsilon = (*epsilon * self.cfg.epsilon_decay_rate).max(self.cfg.epsilon_min);
    }

    pub fn epsilon(&self) -> f64 {
        *self.epsilon.lock().expect("epsilon mutex poisoned")
    }

    pub fn state_count(&self) -> usize {
        self.qtable.lock().expect("qtable mutex poisoned").len()
    }

    pub fn save_state(&self, path: impl AsRef<Path>) -> Result<(), AgentError> {
        let entries = self.qtable.lock().expect("qtable mutex poisoned").to_entries();
        let persisted = PersistedState {
            entries,
            epsilon: self.epsilon(),
            episodes_observed: *self.episodes_observed.lock().expect("episodes mutex poisoned"),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        qtrade_core::write_atomic(path.as_ref(), &bytes)?;
        Ok(())
    }

    pub fn load_state(&self, path: impl AsRef<Path>) -> Result<bool, AgentError> {
        let Some(bytes) = qtrade_core::read_if_exists(path.as_ref())? else {
            return Ok(false);
        };
        let persisted: PersistedState = serde_json::from_slice(&bytes)?;
        *self.qtable.lock().expect("qtable mutex poisoned") =
            QTable::from_entries(self.cfg.max_states, persisted.entries);
        *self.epsilon.lock().expect("epsilon mutex poisoned") = persisted.epsilon;
        *self.episodes_observed.lock().expect("episodes mutex poisoned") = persisted.episodes_observed;
        Ok(true)
    }
}
