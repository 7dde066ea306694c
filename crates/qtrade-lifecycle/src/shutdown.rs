use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};

use qtrade_broker::BrokerAdapter;
use qtrade_core::Micros;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShutdownConfig {
    pub per_attempt_timeout: Duration,
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            per_attempt_timeout: Duration::from_secs(30),
            max_attempts: 3,
            poll_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolOutcome {
    Flattened,
    StillOpen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    pub status: ShutdownStatus,
    pub per_symbol: BTreeMap<String, SymbolOutcome>,
    pub attempts_used: u32,
}

/// Runs the graceful-shutdown sequence: cancel all working orders, submit a
/// closing MARKET order for every open position, then poll `current_quantity`
/// until every symbol is flat or the per-attempt timeout elapses, retrying
/// up to `cfg.max_attempts` times.
///
/// `open_positions` and `current_quantity` read live portfolio state;
/// `submit_closing_order` places the actual MARKET order through the broker.
/// Kept as closures rather than a concrete portfolio dependency so this
/// crate stays decoupled from the ledger's internals.
pub fn run_graceful_shutdown(
    broker: &dyn BrokerAdapter,
    cfg: &ShutdownConfig,
    mut open_positions: impl FnMut() -> BTreeMap<String, Micros>,
    mut submit_closing_order: impl FnMut(&str, Micros) -> qtrade_broker::BrokerResult<()>,
    mut current_quantity: impl FnMut(&str) -> Micros,
) -> ShutdownReport {
    if let Err(err) = broker.cancel_all_orders() {
        tracing::error!(error = %err, "cancel_all_orders failed during graceful shutdown");
    }

    let originally_open: Vec<String> = open_positions()
        .into_iter()
        .filter(|(_, qty)| !qty.is_zero())
        .map(|(symbol, _)| symbol)
        .collect();

    let mut remaining: Vec<String> = originally_open.clone();
    let mut attempts_used = 0;

    for attempt in 1..=cfg.max_attempts {
        attempts_used = attempt;
        if remaining.is_empty() {
            break;
        }

        for symbol in &remaining {
            let qty = current_quantity(symbol);
            if qty.is_zero() {
                continue;
            }
            if let Err(err) = submit_closing_order(symbol, qty) {
                tracing::error!(symbol = %symbol, error = %err, "closing order submission failed");
            }
        }

        let deadline = Instant::now() + cfg.per_attempt_timeout;
        loop {
            remaining.retain(|symbol| !current_quantity(symbol).is_zero());
            if remaining.is_empty() || Instant::now() >= deadline {
                break;
            }
            thread::sleep(cfg.poll_interval);
        }
    }

    for symbol in &remaining {
        tracing::warn!(symbol = %symbol, "position still open after graceful shutdown attempts exhausted");
    }

    let status = if remaining.is_empty() {
        ShutdownStatus::Success
    } else if remaining.len() < originally_open.len() {
        ShutdownStatus::Partial
    } else {
        ShutdownStatus::Failed
    };

    let per_symbol = originally_open
        .into_iter()
        .map(|symbol| {
            let outcome = if remaining.contains(&symbol) {
                SymbolOutcome::StillOpen
            } else {
                SymbolOutcome::Flattened
            };
            (symbol, outcome)
        })
        .collect();

    ShutdownReport {
        status,
        per_symbol,
        attempts_used,
    }
}
