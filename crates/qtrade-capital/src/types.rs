use qtrade_core::Micros;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl WithdrawalFrequency {
    /// Minimum whole days that must elapse between withdrawals.
    pub fn min_interval_days(self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 28,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CapitalMode {
    /// All profit stays in the account and compounds.
    Compounding,
    /// Withdraw profit above `target_capital` once it clears
    /// `withdrawal_threshold`, at most once per `frequency`.
    Fixed {
        target_capital: Micros,
        withdrawal_threshold: Micros,
        frequency: WithdrawalFrequency,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub amount: Micros,
    pub equity_before: Micros,
    pub timestamp: qtrade_core::UtcInstant,
}
