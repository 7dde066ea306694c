//! Per-symbol position state with weighted-average cost basis.

use qtrade_core::{Micros, UtcInstant};
use serde::{Deserialize, Serialize};

/// A held position for one symbol.
///
/// `quantity` is signed: positive long, negative short. `average_cost` is
/// only meaningful while `quantity != 0`; a flat position is removed from
/// the portfolio's position map entirely rather than retained at zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Micros,
    pub average_cost: Micros,
    pub multiplier: i64,
    pub entry_timestamp: UtcInstant,
}

impl Position {
    pub fn new(
        symbol: impl Into<String>,
        quantity: Micros,
        average_cost: Micros,
        multiplier: i64,
        entry_timestamp: UtcInstant,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_cost,
            multiplier,
            entry_timestamp,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    pub fn is_long(&self) -> bool {
        self.quantity.signum() > 0
    }

    pub fn is_short(&self) -> bool {
        self.quantity.signum() < 0
    }

    /// Notional market value at `mark`: `quantity * mark * multiplier`.
    pub fn notional(&self, mark: Micros) -> Micros {
        mark.mul_amount(self.quantity).mul_multiplier(self.multiplier)
    }
}
