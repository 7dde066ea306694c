//! The single immutable config record a loaded, validated YAML document
//! deserializes into. Reuses the constituent facades' own config types
//! directly where their shape is YAML-friendly (`RiskConfig`, `AgentConfig`,
//! `ReconcileConfig`, `CapitalMode`, `PipelineConfig`); sections with
//! `Duration`-typed fields get a plain-number DTO here instead, converted at
//! the edge, since `serde`'s built-in `Duration` impl serializes as a
//! `{secs, nanos}` object rather than the bare integer an operator would
//! write by hand.

use std::path::PathBuf;
use std::time::Duration;

use qtrade_agent::AgentConfig;
use qtrade_aggregator::Timeframe;
use qtrade_broker::FillRulesConfig;
use qtrade_capital::CapitalMode;
use qtrade_core::Micros;
use qtrade_lifecycle::ShutdownConfig;
use qtrade_patterns::PatternConfig;
use qtrade_pipeline::PipelineConfig;
use qtrade_reconcile::ReconcileConfig;
use qtrade_risk::RiskConfig;
use qtrade_runtime::CoordinatorConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSection {
    pub initial_cash: Micros,
    pub symbols: Vec<String>,
    pub base_bar_interval_seconds: i64,
    pub warmup_bars: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregatorSection {
    pub timeframes: Vec<Timeframe>,
    pub max_retention: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdempotencySection {
    pub ttl_seconds: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckpointSection {
    pub dir: PathBuf,
    pub queue_capacity: usize,
}

/// Optional — absent entirely in backtest configs, where there is no broker
/// to reconcile against or flatten positions with.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LifecycleSection {
    pub shutdown_per_attempt_timeout_seconds: u64,
    pub shutdown_max_attempts: u32,
    pub shutdown_poll_interval_ms: u64,
    pub eod_minutes_before_close: i64,
}

impl LifecycleSection {
    pub fn to_shutdown_config(&self) -> ShutdownConfig {
        ShutdownConfig {
            per_attempt_timeout: Duration::from_secs(self.shutdown_per_attempt_timeout_seconds),
            max_attempts: self.shutdown_max_attempts,
            poll_interval: Duration::from_millis(self.shutdown_poll_interval_ms),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub session: SessionSection,
    pub pipeline: PipelineConfig,
    pub aggregator: AggregatorSection,
    pub risk: RiskConfig,
    pub agent: AgentConfig,
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default)]
    pub capital: Option<CapitalMode>,
    pub idempotency: IdempotencySection,
    #[serde(default)]
    pub checkpoint: Option<CheckpointSection>,
    #[serde(default)]
    pub broker: Option<BrokerSection>,
    #[serde(default)]
    pub reconcile: Option<ReconcileConfig>,
    #[serde(default)]
    pub lifecycle: Option<LifecycleSection>,
    #[serde(default)]
    pub coordinator: CoordinatorConfigSection,
}

/// Paper/live-only broker wiring: the [`FillRulesConfig`] fill-simulation
/// knobs plus the flat per-fill commission `PaperBroker::new` also takes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrokerSection {
    #[serde(default)]
    pub fill_rules: FillRulesConfig,
    pub commission_per_fill: Micros,
}

/// Plain-number mirror of [`CoordinatorConfig`] for the same reason
/// [`LifecycleSection`] exists: `Duration` fields don't deserialize from a
/// bare integer through `serde`'s own impl.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinatorConfigSection {
    pub checkpoint_every_n_events: u64,
    pub capital_check_every_n_events: u64,
    pub reconcile_timeout_seconds: u64,
    pub consecutive_checkpoint_failure_threshold: u32,
    pub checkpoint_drain_timeout_seconds: u64,
    pub estimated_commission_per_order: Micros,
}

impl Default for CoordinatorConfigSection {
    fn default() -> Self {
        let defaults = CoordinatorConfig::default();
        Self {
            checkpoint_every_n_events: defaults.checkpoint_every_n_events,
            capital_check_every_n_events: defaults.capital_check_every_n_events,
            reconcile_timeout_seconds: defaults.reconcile_timeout.as_secs(),
            consecutive_checkpoint_failure_threshold: defaults
                .consecutive_checkpoint_failure_threshold,
            checkpoint_drain_timeout_seconds: defaults.checkpoint_drain_timeout.as_secs(),
            estimated_commission_per_order: defaults.estimated_commission_per_order,
        }
    }
}

impl CoordinatorConfigSection {
    pub fn to_coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            checkpoint_every_n_events: self.checkpoint_every_n_events,
            capital_check_every_n_events: self.capital_check_every_n_events,
            reconcile_timeout: Duration::from_secs(self.reconcile_timeout_seconds),
            consecutive_checkpoint_failure_threshold: self
                .consecutive_checkpoint_failure_threshold,
            checkpoint_drain_timeout: Duration::from_secs(self.checkpoint_drain_timeout_seconds),
            estimated_commission_per_order: self.estimated_commission_per_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_layered_yaml_from_strings;

    const FULL_YAML: &str = r#"
session:
  initial_cash: "10000000000"
  symbols: ["AAPL", "MSFT"]
  base_bar_interval_seconds: 60
  warmup_bars: 30

pipeline:
  primary_timeframe: M5
  cross_timeframes: [M15, H1]
  min_bars_required: 30
  short_ma_window: 10
  long_ma_window: 30
  volatility_window: 10
  volatility_baseline_window: 30
  max_position_pct: 0.25
  min_order_quantity: "1000000"
  multiplier: 1
  broker_min_notional: "0"

aggregator:
  timeframes: [M5, M15, H1]
  max_retention: 500

risk:
  max_position_pct: 0.25
  max_concurrent_positions: 10
  window_seconds: 60
  max_orders_per_window: 20
  min_balance_enabled: true
  minimum_balance: "0"
  max_daily_loss_pct: 0.03
  max_drawdown_pct: 0.15

agent:
  epsilon_start: 1.0
  epsilon_min: 0.05
  epsilon_decay_rate: 0.001
  alpha: 0.1
  gamma: 0.95
  max_states: 100000
  q_decay_lambda: 0.0
  base_size_fraction: 0.1
  max_position_pct: 0.25
  min_confidence_threshold: 0.2
  risk_penalty: 0.5
  transaction_cost: 0.0005

patterns:
  stale_threshold_seconds: 300
  chase_threshold_pct: 0.05
  low_liquidity_ratio: 0.3
  circuit_breaker_consecutive_moves: 3
  circuit_breaker_move_pct: 0.02

idempotency:
  ttl_seconds: 300

broker:
  fill_rules:
    slippage_bps: 2.0
    partial_fill_probability: 0.0
  commission_per_fill: "1000000"
"#;

    #[test]
    fn full_session_config_deserializes() {
        let loaded = load_layered_yaml_from_strings(&[FULL_YAML]).unwrap();
        let cfg: SessionConfig = serde_json::from_value(loaded.config_json).unwrap();
        assert_eq!(cfg.session.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(cfg.pipeline.primary_timeframe, Timeframe::M5);
        assert!(cfg.capital.is_none());
        assert!(cfg.checkpoint.is_none());
        assert_eq!(cfg.patterns.stale_threshold_seconds, 300);
        let broker = cfg.broker.expect("broker section present");
        assert_eq!(broker.fill_rules.slippage_bps, 2.0);
        assert_eq!(broker.commission_per_fill, Micros::new(1_000_000));
        assert_eq!(
            cfg.coordinator.checkpoint_every_n_events,
            CoordinatorConfig::default().checkpoint_every_n_events
        );
    }

    #[test]
    fn lifecycle_section_converts_to_shutdown_config() {
        let section = LifecycleSection {
            shutdown_per_attempt_timeout_seconds: 30,
            shutdown_max_attempts: 3,
            shutdown_poll_interval_ms: 500,
            eod_minutes_before_close: 15,
        };
        let shutdown = section.to_shutdown_config();
        assert_eq!(shutdown.per_attempt_timeout, Duration::from_secs(30));
        assert_eq!(shutdown.max_attempts, 3);
    }
}
