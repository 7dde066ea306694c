//! Risk engine configuration and decision types.

use qtrade_core::{Micros, UtcInstant};
use serde::{Deserialize, Serialize};

/// Static risk configuration, loaded once from [`qtrade_config`] and never
/// mutated for the life of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub max_position_pct: f64,
    pub max_concurrent_positions: usize,
    pub window_seconds: i64,
    pub max_orders_per_window: usize,
    pub min_balance_enabled: bool,
    pub minimum_balance: Micros,
    pub max_daily_loss_pct: f64,
    pub max_drawdown_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_pct: 0.25,
            max_concurrent_positions: 10,
            window_seconds: 60,
            max_orders_per_window: 20,
            min_balance_enabled: true,
            minimum_balance: Micros::ZERO,
            max_daily_loss_pct: 0.03,
            max_drawdown_pct: 0.15,
        }
    }
}

/// Why a halted (or halting) session stopped trading.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    Manual,
    DailyLoss,
    Drawdown,
    Reconciliation,
    RateLimit,
}

impl HaltReason {
    /// Only `DailyLoss` auto-resumes when the UTC calendar date advances;
    /// every other halt requires an explicit [`crate::RiskEngine::resume`].
    pub fn auto_resumes_on_new_day(self) -> bool {
        matches!(self, HaltReason::DailyLoss)
    }
}

/// Caller-observable rejection kinds from `pre_trade_check`, ordered to
/// match the sequence the checks run in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    Halted,
    PositionLimit,
    ConcurrentPositions,
    RateLimit,
    MinBalance,
    DailyLoss,
    Drawdown,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Halted => "session is halted",
            Self::PositionLimit => "position size cap exceeded",
            Self::ConcurrentPositions => "concurrent-positions cap exceeded",
            Self::RateLimit => "order rate limit exceeded",
            Self::MinBalance => "minimum balance protection triggered",
            Self::DailyLoss => "daily loss guard triggered",
            Self::Drawdown => "drawdown guard triggered",
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for RejectionReason {}

/// Inputs to a single `pre_trade_check` call.
#[derive(Clone, Debug)]
pub struct PreTradeInput {
    pub symbol: String,
    pub delta_quantity: Micros,
    pub price: Micros,
    pub timestamp: UtcInstant,
    pub equity: Micros,
    /// Signed quantity of the symbol's current position, zero if flat.
    pub current_position_quantity: Micros,
    /// True if `delta_quantity` would open a symbol with no current position.
    pub opens_new_symbol: bool,
    pub active_position_count: usize,
    pub multiplier: i64,
    pub commission: Micros,
}

/// The outcome of a `pre_trade_check` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RiskDecision {
    Accept,
    Reject(RejectionReason),
}

impl RiskDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, RiskDecision::Accept)
    }
}
