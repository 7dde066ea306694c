//! Deterministic paper-trading broker.
//!
//! Driven by a historical or generated bar stream: [`PaperBroker::process_bar`]
//! evaluates every pending order against that bar's OHLC and emits fills
//! synchronously, on the caller's thread, per spec.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use qtrade_core::Micros;
use qtrade_types::{Bar, ExecutionReport, Order};
use rand::rngs::ThreadRng;

use crate::adapter::{BrokerAdapter, BrokerResult};
use crate::fill_rules::{self, FillRulesConfig};

#[derive(Clone, Debug)]
struct PendingOrder {
    order: Order,
    order_id: String,
    remaining_quantity: Micros,
}

#[derive(Default)]
struct PaperState {
    pending: BTreeMap<String, PendingOrder>,
    positions: BTreeMap<String, Micros>,
    next_order_id: u64,
}

pub struct PaperBroker {
    cfg: FillRulesConfig,
    commission_per_fill: Micros,
    state: Mutex<PaperState>,
}

impl PaperBroker {
    pub fn new(cfg: FillRulesConfig, commission_per_fill: Micros) -> Self {
        Self {
            cfg,
            commission_per_fill,
            state: Mutex::new(PaperState::default()),
        }
    }

    /// Evaluate every pending order against `bar`, emitting a fill for each
    /// one whose trigger condition is met. Orders that only partially fill
    /// remain pending for the next bar.
    pub fn process_bar(&self, bar: &Bar) -> Vec<ExecutionReport> {
        let mut rng = rand::thread_rng();
        let mut state = self.state.lock().expect("paper broker mutex poisoned");
        let mut reports = Vec::new();
        let mut to_remove = Vec::new();

        for (client_order_id, pending) in state.pending.iter_mut() {
            if pending.order.symbol != bar.symbol {
                continue;
            }
            let Some(fill_price) = fill_rules::evaluate_trigger(
                pending.order.side,
                pending.order.kind,
                pending.order.limit_price,
                pending.order.stop_price,
                bar,
                self.cfg.slippage_bps,
            ) else {
                continue;
            };

            let fill_qty = self.partial_fill_quantity(pending.remaining_quantity, &mut rng);
            pending.remaining_quantity = pending.remaining_quantity.saturating_sub(fill_qty);

            reports.push(ExecutionReport {
                client_order_id: client_order_id.clone(),
                symbol: pending.order.symbol.clone(),
                side: pending.order.side,
                fill_price,
                filled_quantity: fill_qty,
                commission: self.commission_per_fill,
                multiplier: pending.order.multiplier,
                timestamp: bar.timestamp,
            });

            let signed = match pending.order.side {
                qtrade_types::Side::Buy => fill_qty,
                qtrade_types::Side::Sell => -fill_qty,
            };
            let position = state.positions.entry(pending.order.symbol.clone()).or_insert(Micros::ZERO);
            *position = position.saturating_add(signed);

            if pending.remaining_quantity.is_zero() {
                to_remove.push(client_order_id.clone());
            }
        }

        for id in to_remove {
            state.pending.remove(&id);
        }

        reports
    }

    fn partial_fill_quantity(&self, remaining: Micros, rng: &mut ThreadRng) -> Micros {
        fill_rules::partial_fill_quantity(remaining, self.cfg.partial_fill_probability, rng)
    }

    pub fn pending_order_count(&self) -> usize {
        self.state.lock().expect("paper broker mutex poisoned").pending.len()
    }
}

impl BrokerAdapter for PaperBroker {
    fn start(&self) -> BrokerResult<()> {
        Ok(())
    }

    fn stop(&self) -> BrokerResult<()> {
        Ok(())
    }

    fn submit(&self, order: &Order) -> BrokerResult<String> {
        let mut state = self.state.lock().expect("paper broker mutex poisoned");
        if let Some(existing) = state.pending.get(&order.client_order_id) {
            // Idempotent resubmission: broker de-duplicates on client_order_id.
            return Ok(existing.order_id.clone());
        }
        state.next_order_id += 1;
        let order_id = format!("paper-{}", state.next_order_id);
        state.pending.insert(
            order.client_order_id.clone(),
            PendingOrder {
                order: order.clone(),
                order_id: order_id.clone(),
                remaining_quantity: order.quantity,
            },
        );
        Ok(order_id)
    }

    fn cancel(&self, order_id: &str) -> BrokerResult<()> {
        let mut state = self.state.lock().expect("paper broker mutex poisoned");
        state.pending.retain(|_, pending| pending.order_id != order_id);
        Ok(())
    }

    fn cancel_all_orders(&self) -> BrokerResult<()> {
        let mut state = self.state.lock().expect("paper broker mutex poisoned");
        state.pending.clear();
        Ok(())
    }

    fn reconcile_positions(&self, _timeout: Duration) -> BrokerResult<BTreeMap<String, Micros>> {
        Ok(self
            .state
            .lock()
            .expect("paper broker mutex poisoned")
            .positions
            .clone())
    }
}
