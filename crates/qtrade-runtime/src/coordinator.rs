//! The session coordinator: owns every facade below it and drives the
//! `start` → `on_bar`/`on_fill` → `stop` lifecycle. Component wiring itself
//! (building the facades from configuration) happens one layer up, in a
//! factory that hands this module already-constructed handles.
//!
//! Lock order, for any call path that needs more than one: Portfolio → Risk
//! → Aggregator → QTable → in-flight order map → Idempotency. Every method
//! here acquires at most one of these beyond what the facades themselves
//! take internally, so the order is never actually contended within a call.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use qtrade_agent::{allowed_actions, FsdAgent};
use qtrade_aggregator::Aggregator;
use qtrade_broker::BrokerAdapter;
use qtrade_capital::{CapitalLedger, CapitalMode};
use qtrade_checkpoint::CheckpointManager;
use qtrade_core::{Micros, UtcInstant};
use qtrade_idempotency::IdempotencyTracker;
use qtrade_lifecycle::{
    run_graceful_shutdown, EodFlattenSchedule, SessionCalendar, ShutdownConfig, ShutdownReport,
    StopController, StopReason,
};
use qtrade_patterns::PatternConfig;
use qtrade_pipeline::{run_decision_pipeline, PipelineConfig, PipelineOutcome, PositionContext};
use qtrade_portfolio::{MarkMap, Portfolio, PortfolioError};
use qtrade_reconcile::{self, PositionMap, ReconcileConfig, ReconcileOutcome};
use qtrade_risk::{HaltReason, RiskEngine, RiskState};
use qtrade_types::{Bar, ExecutionReport, Order, OrderKind, Side};

use crate::config::CoordinatorConfig;
use crate::error::CoordinatorError;
use crate::inflight::{InFlightOrder, InFlightOrders};
use crate::state::CoordinatorState;

/// Everything the coordinator needs handed to it, already constructed. See
/// the factory module in the CLI crate for how these get built from a
/// loaded session configuration.
pub struct CoordinatorDeps {
    pub portfolio: Arc<Portfolio>,
    pub risk: Arc<RiskEngine>,
    pub aggregator: Arc<Aggregator>,
    pub agent: Arc<FsdAgent>,
    pub idempotency: Arc<IdempotencyTracker>,
    pub broker: Arc<dyn BrokerAdapter>,
    pub checkpoint: CheckpointManager,
    pub capital_mode: Option<CapitalMode>,
    pub stop_controller: Arc<StopController>,
    pub eod: Option<(Arc<EodFlattenSchedule>, Arc<dyn SessionCalendar>)>,
    pub pattern_cfg: PatternConfig,
    pub pipeline_cfg: PipelineConfig,
    pub reconcile_cfg: ReconcileConfig,
    pub shutdown_cfg: ShutdownConfig,
    pub cfg: CoordinatorConfig,
}

/// Owns one trading session end to end: the decision pipeline on bar
/// arrival, fill application and learning on fill, periodic checkpointing,
/// and the reconcile/shutdown bookends.
pub struct Coordinator {
    portfolio: Arc<Portfolio>,
    risk: Arc<RiskEngine>,
    aggregator: Arc<Aggregator>,
    agent: Arc<FsdAgent>,
    idempotency: Arc<IdempotencyTracker>,
    broker: Arc<dyn BrokerAdapter>,
    checkpoint: CheckpointManager,
    capital: Mutex<Option<CapitalLedger>>,
    capital_mode: Option<CapitalMode>,
    stop_controller: Arc<StopController>,
    eod: Option<(Arc<EodFlattenSchedule>, Arc<dyn SessionCalendar>)>,
    pattern_cfg: PatternConfig,
    pipeline_cfg: PipelineConfig,
    reconcile_cfg: ReconcileConfig,
    shutdown_cfg: ShutdownConfig,
    cfg: CoordinatorConfig,
    marks: Mutex<MarkMap>,
    in_flight: InFlightOrders,
    state: Mutex<CoordinatorState>,
    event_count: AtomicU64,
    consecutive_checkpoint_failures: AtomicU32,
}

impl Coordinator {
    pub fn new(deps: CoordinatorDeps) -> Self {
        Self {
            portfolio: deps.portfolio,
            risk: deps.risk,
            aggregator: deps.aggregator,
            agent: deps.agent,
            idempotency: deps.idempotency,
            broker: deps.broker,
            checkpoint: deps.checkpoint,
            capital: Mutex::new(None),
            capital_mode: deps.capital_mode,
            stop_controller: deps.stop_controller,
            eod: deps.eod,
            pattern_cfg: deps.pattern_cfg,
            pipeline_cfg: deps.pipeline_cfg,
            reconcile_cfg: deps.reconcile_cfg,
            shutdown_cfg: deps.shutdown_cfg,
            cfg: deps.cfg,
            marks: Mutex::new(MarkMap::new()),
            in_flight: InFlightOrders::new(),
            state: Mutex::new(CoordinatorState::Init),
            event_count: AtomicU64::new(0),
            consecutive_checkpoint_failures: AtomicU32::new(0),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        *self.state.lock().expect("coordinator state mutex poisoned")
    }

    /// Loads any prior checkpoint, starts the broker, reconciles positions,
    /// and transitions to `Running`. A reconcile mismatch at or above the
    /// configured threshold halts the risk engine (trading stays internally
    /// halted) rather than aborting startup outright.
    pub fn start(&self, now: UtcInstant) -> Result<(), CoordinatorError> {
        self.require_state(CoordinatorState::Init)?;
        *self.state.lock().expect("coordinator state mutex poisoned") = CoordinatorState::Starting;

        if let Some(snapshot) = self.checkpoint.load("portfolio")? {
            self.portfolio.restore(snapshot);
        }
        if let Some(risk_state) = self.checkpoint.load::<RiskState>("risk_state")? {
            self.risk.restore_state(risk_state);
        }
        if let Err(err) = self.agent.load_state(self.checkpoint.dir().join("qtable.json")) {
            tracing::warn!(error = %err, "qtable checkpoint load failed, starting from a fresh table");
        }
        if let Some(mode) = &self.capital_mode {
            let records = self
                .checkpoint
                .load::<Vec<qtrade_capital::WithdrawalRecord>>("capital_ledger")?
                .unwrap_or_default();
            let last_withdrawal = records.last().map(|record| record.timestamp);
            *self.capital.lock().expect("capital mutex poisoned") =
                Some(CapitalLedger::restore(mode.clone(), last_withdrawal, records));
        }

        self.broker.start().map_err(CoordinatorError::Broker)?;

        let internal_positions: PositionMap = self
            .portfolio
            .snapshot()
            .positions
            .iter()
            .map(|(symbol, position)| (symbol.clone(), position.quantity))
            .collect();
        let broker_positions = self
            .broker
            .reconcile_positions(self.cfg.reconcile_timeout)
            .map_err(CoordinatorError::Broker)?;
        let outcome = qtrade_reconcile::reconcile(&self.reconcile_cfg, &internal_positions, &broker_positions);
        match &outcome {
            ReconcileOutcome::Halt { deltas } => {
                tracing::error!(?deltas, "startup reconciliation mismatch at or above threshold, halting");
                self.risk.halt(HaltReason::Reconciliation);
            }
            ReconcileOutcome::Clean { deltas } => {
                tracing::info!(?deltas, "startup reconciliation clean");
            }
        }
        self.apply_reconcile_overwrite(&outcome);

        *self.state.lock().expect("coordinator state mutex poisoned") = CoordinatorState::Running;
        Ok(())
    }

    /// Overwrites the internal cost-basis-preserving quantity of each
    /// position named in a clean reconcile, when configured to. A symbol
    /// the broker reports that the ledger has no cost basis for is skipped
    /// with a warning rather than fabricated — an operator has to resolve
    /// that one by hand.
    fn apply_reconcile_overwrite(&self, outcome: &ReconcileOutcome) {
        if !self.reconcile_cfg.overwrite_from_broker || !outcome.is_clean() {
            return;
        }
        let mut snapshot = self.portfolio.snapshot();
        let mut changed = false;
        for delta in outcome.deltas() {
            if delta.internal_qty == delta.broker_qty {
                continue;
            }
            match snapshot.positions.get_mut(&delta.symbol) {
                Some(position) => {
                    position.quantity = delta.broker_qty;
                    changed = true;
                }
                None if !delta.broker_qty.is_zero() => {
                    tracing::warn!(
                        symbol = %delta.symbol,
                        "broker reports a position with no internal cost basis, skipping reconcile overwrite"
                    );
                }
                None => {}
            }
        }
        if changed {
            self.portfolio.restore(snapshot);
        }
    }

    /// Runs the decision pipeline for one symbol's new bar. Returns `Ok(None)`
    /// if a stop has already been requested — the coordinator keeps existing
    /// positions live for `stop()` to flatten but stops opening new ones.
    pub fn on_bar(&self, symbol: &str, bar: &Bar, now: UtcInstant) -> Result<Option<PipelineOutcome>, CoordinatorError> {
        self.require_state(CoordinatorState::Running)?;

        if self.stop_controller.is_stop_requested() {
            return Ok(None);
        }

        self.risk.daily_reset(now, self.current_equity()?);

        let position = self.portfolio.position(symbol);
        let current_position_quantity = position.as_ref().map(|p| p.quantity).unwrap_or(Micros::ZERO);
        let active_position_count = self.portfolio.open_position_count();
        let equity = self.current_equity()?;

        let context = PositionContext {
            current_position_quantity,
            active_position_count,
            equity,
            commission: self.cfg.estimated_commission_per_order,
        };

        let outcome = run_decision_pipeline(
            symbol,
            bar,
            now,
            &self.aggregator,
            &self.pattern_cfg,
            &self.agent,
            &self.risk,
            &self.idempotency,
            self.broker.as_ref(),
            &self.pipeline_cfg,
            &context,
        );

        if let PipelineOutcome::Submitted { ref order, state, action, .. } = outcome {
            self.in_flight.insert(
                order.client_order_id.clone(),
                InFlightOrder {
                    symbol: symbol.to_string(),
                    state,
                    action,
                    ordered_quantity: order.quantity,
                    cumulative_filled: Micros::ZERO,
                    submitted_at: now,
                },
            );
        }

        self.marks
            .lock()
            .expect("marks mutex poisoned")
            .insert(symbol.to_string(), bar.close);

        self.on_event(now)?;

        Ok(Some(outcome))
    }

    /// Applies one execution report: overfill check, ledger update, mark
    /// refresh, risk bookkeeping, and the Q-learning update for the order
    /// that produced it.
    ///
    /// The Bellman update's `next_state` approximates the state the agent
    /// would see at the next decision point with the *same* discretized
    /// state the order was decided from — a fill carries no new bar, so
    /// there is no fresh feature snapshot to discretize. This trades a
    /// slightly biased bootstrap for not having to run feature extraction
    /// off-cycle; the next real bar's `on_bar` call corrects it forward.
    pub fn on_fill(&self, report: &ExecutionReport, now: UtcInstant) -> Result<(), CoordinatorError> {
        self.require_state(CoordinatorState::Running)?;

        let learning_input = match self.in_flight.record_fill(&report.client_order_id, report.filled_quantity) {
            Some(Ok(state_action)) => Some(state_action),
            Some(Err((ordered_quantity, cumulative_filled))) => {
                let err = PortfolioError::Overfill {
                    client_order_id: report.client_order_id.clone(),
                    ordered_quantity: ordered_quantity.to_string(),
                    cumulative_filled: cumulative_filled.to_string(),
                };
                tracing::error!(client_order_id = %report.client_order_id, %err, "fatal overfill, requesting stop");
                self.stop_controller.request_stop(StopReason::Manual);
                return Err(err.into());
            }
            None => {
                tracing::warn!(
                    client_order_id = %report.client_order_id,
                    "fill for an order this coordinator did not submit, applying without a learning update"
                );
                None
            }
        };

        let realized_pnl = self.portfolio.apply_fill(report)?;

        self.marks
            .lock()
            .expect("marks mutex poisoned")
            .insert(report.symbol.clone(), report.fill_price);
        let equity = self.current_equity()?;

        self.risk.register_trade(realized_pnl, report.commission, equity);

        if let Some((state, action)) = learning_input {
            let next_position_quantity = self
                .portfolio
                .position(&report.symbol)
                .map(|p| p.quantity)
                .unwrap_or(Micros::ZERO);
            let position_notional = next_position_quantity.abs().mul_amount(report.fill_price);
            let next_allowed = allowed_actions(next_position_quantity);
            self.agent.learn(state, action, realized_pnl, position_notional, &state, &next_allowed);
        }

        self.save_checkpoint();
        self.on_event(now)?;
        Ok(())
    }

    /// Event bookkeeping shared by `on_bar` and `on_fill`: periodic capital
    /// withdrawal check, EOD flatten trigger, periodic checkpoint save.
    fn on_event(&self, now: UtcInstant) -> Result<(), CoordinatorError> {
        let count = self.event_count.fetch_add(1, Ordering::SeqCst) + 1;

        if count % self.cfg.capital_check_every_n_events == 0 {
            self.maybe_withdraw(now)?;
        }

        if let Some((schedule, calendar)) = &self.eod {
            if schedule.should_flatten(calendar.as_ref(), now) {
                tracing::info!("end-of-day flatten window reached, requesting stop");
                self.stop_controller.request_stop(StopReason::EodFlatten);
            }
        }

        if count % self.cfg.checkpoint_every_n_events == 0 {
            self.save_checkpoint();
        }

        Ok(())
    }

    fn maybe_withdraw(&self, now: UtcInstant) -> Result<(), CoordinatorError> {
        let mut capital = self.capital.lock().expect("capital mutex poisoned");
        let Some(ledger) = capital.as_mut() else {
            return Ok(());
        };
        let equity = self.current_equity()?;
        let free_cash = self.portfolio.cash();
        if let Some(amount) = ledger.check_and_withdraw(equity, free_cash, now) {
            self.portfolio.withdraw_cash(amount, "scheduled capital withdrawal", now)?;
            tracing::info!(amount = %amount, "scheduled capital withdrawal applied");
        }
        Ok(())
    }

    fn current_equity(&self) -> Result<Micros, CoordinatorError> {
        let marks = self.marks.lock().expect("marks mutex poisoned").clone();
        Ok(self.portfolio.get_equity(&marks)?)
    }

    fn save_checkpoint(&self) {
        if let Err(err) = self.checkpoint.save("portfolio", &self.portfolio.snapshot()) {
            self.note_checkpoint_failure(&err);
        } else {
            self.consecutive_checkpoint_failures.store(0, Ordering::SeqCst);
        }
        if let Err(err) = self.checkpoint.save("risk_state", &self.risk.snapshot_state()) {
            self.note_checkpoint_failure(&err);
        }
        if let Some(ledger) = self.capital.lock().expect("capital mutex poisoned").as_ref() {
            if let Err(err) = self.checkpoint.save("capital_ledger", &ledger.records()) {
                self.note_checkpoint_failure(&err);
            }
        }
        if let Err(err) = self.agent.save_state(self.checkpoint.dir().join("qtable.json")) {
            tracing::error!(error = %err, "qtable checkpoint save failed");
        }
    }

    /// Checkpoint failures never halt trading by themselves (spec: the
    /// broker and risk controls are the trading-safety boundary, not
    /// durability); a run of consecutive failures is escalated to an error
    /// log so an operator notices before a real crash loses state.
    fn note_checkpoint_failure(&self, err: &qtrade_checkpoint::CheckpointError) {
        let failures = self.consecutive_checkpoint_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= self.cfg.consecutive_checkpoint_failure_threshold {
            tracing::error!(error = %err, failures, "checkpoint has failed repeatedly, state durability is at risk");
        } else {
            tracing::warn!(error = %err, failures, "checkpoint save failed");
        }
    }

    /// Cancels working orders, flattens every open position, drains the
    /// checkpoint queue, and transitions to `Stopped`. Idempotent in the
    /// sense that calling it twice is safe, but only the first call does
    /// any work — `require_state` rejects the second from any state other
    /// than `Running`.
    pub fn stop(self: Arc<Self>, now: UtcInstant) -> Result<ShutdownReport, CoordinatorError> {
        self.require_state(CoordinatorState::Running)?;
        *self.state.lock().expect("coordinator state mutex poisoned") = CoordinatorState::Stopping;

        let portfolio = Arc::clone(&self.portfolio);
        let broker = Arc::clone(&self.broker);
        let positions_for_open = Arc::clone(&portfolio);
        let positions_for_qty = Arc::clone(&portfolio);
        let broker_for_submit = Arc::clone(&broker);

        let report = run_graceful_shutdown(
            broker.as_ref(),
            &self.shutdown_cfg,
            move || open_positions(&positions_for_open),
            move |symbol, quantity| submit_closing_order(broker_for_submit.as_ref(), symbol, quantity, now),
            move |symbol| positions_for_qty.position(symbol).map(|p| p.quantity).unwrap_or(Micros::ZERO),
        );

        self.save_checkpoint();

        if let Err(err) = self.broker.stop() {
            tracing::error!(error = %err, "broker stop failed during shutdown");
        }

        *self.state.lock().expect("coordinator state mutex poisoned") = CoordinatorState::Stopped;
        Ok(report)
    }

    /// Blocks the caller's thread until every already-enqueued checkpoint
    /// write has drained, bounded by `cfg.checkpoint_drain_timeout`. Call
    /// after `stop()` once no further `on_bar`/`on_fill` calls will arrive;
    /// consumes the coordinator since the checkpoint manager itself is
    /// one-shot on shutdown.
    pub fn drain_checkpoints(self) -> qtrade_checkpoint::ShutdownOutcome {
        self.checkpoint.shutdown(self.cfg.checkpoint_drain_timeout)
    }

    fn require_state(&self, expected: CoordinatorState) -> Result<(), CoordinatorError> {
        let state = *self.state.lock().expect("coordinator state mutex poisoned");
        if state != expected {
            return Err(CoordinatorError::WrongState {
                expected: state_name(expected),
            });
        }
        Ok(())
    }
}

fn open_positions(portfolio: &Portfolio) -> BTreeMap<String, Micros> {
    portfolio
        .snapshot()
        .positions
        .into_iter()
        .map(|(symbol, position)| (symbol, position.quantity))
        .collect()
}

fn submit_closing_order(
    broker: &dyn BrokerAdapter,
    symbol: &str,
    quantity: Micros,
    now: UtcInstant,
) -> qtrade_broker::BrokerResult<()> {
    let side = if quantity.is_negative() { Side::Buy } else { Side::Sell };
    let order = Order::new(symbol, side, quantity.abs(), OrderKind::Market, None, None, 1, now)
        .map_err(|err| -> Box<dyn std::error::Error + Send + Sync> { Box::new(err) })?;
    broker.submit(&order).map(|_| ())
}

fn state_name(state: CoordinatorState) -> &'static str {
    match state {
        CoordinatorState::Init => "Init",
        CoordinatorState::Starting => "Starting",
        CoordinatorState::Running => "Running",
        CoordinatorState::Stopping => "Stopping",
        CoordinatorState::Stopped => "Stopped",
    }
}
