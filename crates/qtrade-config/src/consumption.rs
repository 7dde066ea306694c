//! Which config pointers each run mode actually reads. Backs
//! [`crate::unused_keys::report_unused_keys`] — a stray key under a known
//! section is a typo that `#[derive(Deserialize)]` would otherwise swallow
//! silently, since unrecognized fields are ignored rather than rejected.
//!
//! Every pointer here names an exact leaf field, so a sibling typo inside an
//! otherwise-recognized section still shows up as unused.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigMode {
    Backtest,
    Paper,
    Live,
}

pub fn consumed_pointers(mode: ConfigMode) -> &'static [&'static str] {
    match mode {
        ConfigMode::Backtest => BACKTEST,
        ConfigMode::Paper => PAPER,
        ConfigMode::Live => LIVE,
    }
}

static BACKTEST: &[&str] = &[
    "/session/initial_cash",
    "/session/symbols",
    "/session/base_bar_interval_seconds",
    "/session/warmup_bars",
    "/pipeline/primary_timeframe",
    "/pipeline/cross_timeframes",
    "/pipeline/min_bars_required",
    "/pipeline/short_ma_window",
    "/pipeline/long_ma_window",
    "/pipeline/volatility_window",
    "/pipeline/volatility_baseline_window",
    "/pipeline/max_position_pct",
    "/pipeline/min_order_quantity",
    "/pipeline/multiplier",
    "/pipeline/broker_min_notional",
    "/aggregator/timeframes",
    "/aggregator/max_retention",
    "/risk/max_position_pct",
    "/risk/max_concurrent_positions",
    "/risk/window_seconds",
    "/risk/max_orders_per_window",
    "/risk/min_balance_enabled",
    "/risk/minimum_balance",
    "/risk/max_daily_loss_pct",
    "/risk/max_drawdown_pct",
    "/agent/epsilon_start",
    "/agent/epsilon_min",
    "/agent/epsilon_decay_rate",
    "/agent/alpha",
    "/agent/gamma",
    "/agent/max_states",
    "/agent/q_decay_lambda",
    "/agent/base_size_fraction",
    "/agent/max_position_pct",
    "/agent/min_confidence_threshold",
    "/agent/risk_penalty",
    "/agent/transaction_cost",
    "/capital/mode",
    "/capital/target_capital",
    "/capital/withdrawal_threshold",
    "/capital/frequency",
    "/idempotency/ttl_seconds",
    "/patterns/stale_threshold_seconds",
    "/patterns/chase_threshold_pct",
    "/patterns/low_liquidity_ratio",
    "/patterns/circuit_breaker_consecutive_moves",
    "/patterns/circuit_breaker_move_pct",
];

static PAPER: &[&str] = &[
    "/session/initial_cash",
    "/session/symbols",
    "/session/base_bar_interval_seconds",
    "/session/warmup_bars",
    "/pipeline/primary_timeframe",
    "/pipeline/cross_timeframes",
    "/pipeline/min_bars_required",
    "/pipeline/short_ma_window",
    "/pipeline/long_ma_window",
    "/pipeline/volatility_window",
    "/pipeline/volatility_baseline_window",
    "/pipeline/max_position_pct",
    "/pipeline/min_order_quantity",
    "/pipeline/multiplier",
    "/pipeline/broker_min_notional",
    "/aggregator/timeframes",
    "/aggregator/max_retention",
    "/risk/max_position_pct",
    "/risk/max_concurrent_positions",
    "/risk/window_seconds",
    "/risk/max_orders_per_window",
    "/risk/min_balance_enabled",
    "/risk/minimum_balance",
    "/risk/max_daily_loss_pct",
    "/risk/max_drawdown_pct",
    "/agent/epsilon_start",
    "/agent/epsilon_min",
    "/agent/epsilon_decay_rate",
    "/agent/alpha",
    "/agent/gamma",
    "/agent/max_states",
    "/agent/q_decay_lambda",
    "/agent/base_size_fraction",
    "/agent/max_position_pct",
    "/agent/min_confidence_threshold",
    "/agent/risk_penalty",
    "/agent/transaction_cost",
    "/capital/mode",
    "/capital/target_capital",
    "/capital/withdrawal_threshold",
    "/capital/frequency",
    "/idempotency/ttl_seconds",
    "/patterns/stale_threshold_seconds",
    "/patterns/chase_threshold_pct",
    "/patterns/low_liquidity_ratio",
    "/patterns/circuit_breaker_consecutive_moves",
    "/patterns/circuit_breaker_move_pct",
    "/checkpoint/dir",
    "/checkpoint/queue_capacity",
    "/broker/keys_env/api_key",
    "/broker/keys_env/api_secret",
    "/broker/fill_rules/slippage_bps",
    "/broker/fill_rules/partial_fill_probability",
    "/broker/commission_per_fill",
];

static LIVE: &[&str] = &[
    "/session/initial_cash",
    "/session/symbols",
    "/session/base_bar_interval_seconds",
    "/session/warmup_bars",
    "/pipeline/primary_timeframe",
    "/pipeline/cross_timeframes",
    "/pipeline/min_bars_required",
    "/pipeline/short_ma_window",
    "/pipeline/long_ma_window",
    "/pipeline/volatility_window",
    "/pipeline/volatility_baseline_window",
    "/pipeline/max_position_pct",
    "/pipeline/min_order_quantity",
    "/pipeline/multiplier",
    "/pipeline/broker_min_notional",
    "/aggregator/timeframes",
    "/aggregator/max_retention",
    "/risk/max_position_pct",
    "/risk/max_concurrent_positions",
    "/risk/window_seconds",
    "/risk/max_orders_per_window",
    "/risk/min_balance_enabled",
    "/risk/minimum_balance",
    "/risk/max_daily_loss_pct",
    "/risk/max_drawdown_pct",
    "/agent/epsilon_start",
    "/agent/epsilon_min",
    "/agent/epsilon_decay_rate",
    "/agent/alpha",
    "/agent/gamma",
    "/agent/max_states",
    "/agent/q_decay_lambda",
    "/agent/base_size_fraction",
    "/agent/max_position_pct",
    "/agent/min_confidence_threshold",
    "/agent/risk_penalty",
    "/agent/transaction_cost",
    "/capital/mode",
    "/capital/target_capital",
    "/capital/withdrawal_threshold",
    "/capital/frequency",
    "/idempotency/ttl_seconds",
    "/patterns/stale_threshold_seconds",
    "/patterns/chase_threshold_pct",
    "/patterns/low_liquidity_ratio",
    "/patterns/circuit_breaker_consecutive_moves",
    "/patterns/circuit_breaker_move_pct",
    "/checkpoint/dir",
    "/checkpoint/queue_capacity",
    "/broker/keys_env/api_key",
    "/broker/keys_env/api_secret",
    "/broker/fill_rules/slippage_bps",
    "/broker/fill_rules/partial_fill_probability",
    "/broker/commission_per_fill",
    "/reconcile/critical_mismatch_threshold",
    "/reconcile/overwrite_from_broker",
    "/lifecycle/shutdown_per_attempt_timeout_seconds",
    "/lifecycle/shutdown_max_attempts",
    "/lifecycle/shutdown_poll_interval_ms",
    "/lifecycle/eod_minutes_before_close",
];
