//! Immutable market-data bar.

use qtrade_core::{Micros, UtcInstant};
use serde::{Deserialize, Serialize};

/// A single OHLCV summary over a fixed interval for one symbol.
///
/// Construction is fallible: [`Bar::new`] enforces `low ≤ open,close ≤ high`
/// and `volume ≥ 0`. Strict per-`(symbol, timeframe)` monotonicity of
/// `timestamp` is an aggregator-level invariant, not checked here (a single
/// bar carries no history to compare against).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: UtcInstant,
    pub open: Micros,
    pub high: Micros,
    pub low: Micros,
    pub close: Micros,
    pub volume: Micros,
}

/// Raised by [`Bar::new`] when the OHLC/volume invariants do not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    LowAboveOpenOrClose,
    HighBelowOpenOrClose,
    LowAboveHigh,
    NegativeVolume,
    EmptySymbol,
    NonPositivePrice,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowAboveOpenOrClose => write!(f, "bar invariant: low must be <= open and close"),
            Self::HighBelowOpenOrClose => write!(f, "bar invariant: high must be >= open and close"),
            Self::LowAboveHigh => write!(f, "bar invariant: low must be <= high"),
            Self::NegativeVolume => write!(f, "bar invariant: volume must be >= 0"),
            Self::EmptySymbol => write!(f, "bar invariant: symbol must not be empty"),
            Self::NonPositivePrice => write!(f, "bar invariant: prices must be > 0"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Bar {
    /// Construct a `Bar`, validating OHLC ordering and non-negative volume.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        timestamp: UtcInstant,
        open: Micros,
        high: Micros,
        low: Micros,
        close: Micros,
        volume: Micros,
    ) -> Result<Self, ValidationError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        if open.is_negative() || high.is_negative() || low.is_negative() || close.is_negative() {
            return Err(ValidationError::NonPositivePrice);
        }
        if low > high {
            return Err(ValidationError::LowAboveHigh);
        }
        if low > open || low > close {
            return Err(ValidationError::LowAboveOpenOrClose);
        }
        if high < open || high < close {
            return Err(ValidationError::HighBelowOpenOrClose);
        }
        if volume.is_negative() {
            return Err(ValidationError::NegativeVolume);
        }
        Ok(Self {
            symbol,
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Percent change of close relative to open, as an `f64` — a statistics
    /// boundary value, never used in ledger arithmetic.
    pub fn change_pct(&self) -> f64 {
        if self.open.is_zero() {
            return 0.0;
        }
        (self.close.to_f64() - self.open.to_f64()) / self.open.to_f64()
    }
}
