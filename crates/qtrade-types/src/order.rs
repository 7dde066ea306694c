//! Order intent, fingerprinting, and execution reports.

use qtrade_core::{Micros, UtcInstant};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for Buy, -1 for Sell — the sign convention used throughout the
    /// ledger to turn an unsigned fill quantity into a signed delta.
    pub fn sign(self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Limit,
    Stop,
}

/// An immutable order intent.
///
/// `client_order_id` is a deterministic fingerprint of
/// `symbol|side|qty|price_or_NULL|submission_instant_ms` — see
/// [`client_order_id`]. It is computed once at construction and never
/// recomputed, so retries that reuse the same `Order` value always carry the
/// same id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    pub quantity: Micros,
    pub kind: OrderKind,
    pub limit_price: Option<Micros>,
    pub stop_price: Option<Micros>,
    pub multiplier: i64,
    pub submitted_at: UtcInstant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NonPositiveQuantity,
    NonPositiveMultiplier,
    EmptySymbol,
    MissingLimitPrice,
    MissingStopPrice,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveQuantity => write!(f, "order invariant: quantity must be > 0"),
            Self::NonPositiveMultiplier => write!(f, "order invariant: multiplier must be >= 1"),
            Self::EmptySymbol => write!(f, "order invariant: symbol must not be empty"),
            Self::MissingLimitPrice => write!(f, "order invariant: LIMIT orders require limit_price"),
            Self::MissingStopPrice => write!(f, "order invariant: STOP orders require stop_price"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Order {
    /// Construct a new order intent, computing the deterministic
    /// `client_order_id` fingerprint from the given fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        quantity: Micros,
        kind: OrderKind,
        limit_price: Option<Micros>,
        stop_price: Option<Micros>,
        multiplier: i64,
        submitted_at: UtcInstant,
    ) -> Result<Self, ValidationError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        if quantity.is_zero() || quantity.is_negative() {
            return Err(ValidationError::NonPositiveQuantity);
        }
        if multiplier < 1 {
            return Err(ValidationError::NonPositiveMultiplier);
        }
        if matches!(kind, OrderKind::Limit) && limit_price.is_none() {
            return Err(ValidationError::MissingLimitPrice);
        }
        if matches!(kind, OrderKind::Stop) && stop_price.is_none() {
            return Err(ValidationError::MissingStopPrice);
        }

        let price_for_fingerprint = limit_price.or(stop_price);
        let client_order_id = client_order_id(
            &symbol,
            side,
            quantity,
            price_for_fingerprint,
            submitted_at,
        );

        Ok(Self {
            client_order_id,
            symbol,
            side,
            quantity,
            kind,
            limit_price,
            stop_price,
            multiplier,
            submitted_at,
        })
    }

    /// Signed quantity delta this order would apply if fully filled at its
    /// nominal side: `+quantity` for Buy, `-quantity` for Sell.
    pub fn signed_quantity(&self) -> Micros {
        match self.side {
            Side::Buy => self.quantity,
            Side::Sell => -self.quantity,
        }
    }
}

/// Deterministic order fingerprint: SHA-256 of
/// `symbol|side|qty|price_or_NULL|submission_instant_ms`, hex-encoded and
/// truncated to the first 16 hex characters.
///
/// `submitted_at` is wall-clock UTC (not bar time), so identical retries
/// issued within the idempotency TTL hash to the same id.
pub fn client_order_id(
    symbol: &str,
    side: Side,
    quantity: Micros,
    price: Option<Micros>,
    submitted_at: UtcInstant,
) -> String {
    let side_str = match side {
        Side::Buy => "BUY",
        Side::Sell => "SELL",
    };
    let price_str = price
        .map(|p| p.raw().to_string())
        .unwrap_or_else(|| "NULL".to_string());
    let millis = submitted_at.as_utc().timestamp_millis();

    let payload = format!(
        "{symbol}|{side_str}|{}|{price_str}|{millis}",
        quantity.raw()
    );

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..16].to_string()
}

/// References an [`Order`] and carries the fill detail the broker reported.
///
/// Cumulative `filled_quantity` across reports for one order must never
/// exceed the order's original `quantity`; callers enforce this (an overfill
/// is a fatal [`OverfillError`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    pub fill_price: Micros,
    pub filled_quantity: Micros,
    pub commission: Micros,
    pub multiplier: i64,
    pub timestamp: UtcInstant,
}

/// Fatal: cumulative fills for an order exceeded its original quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverfillError {
    pub client_order_id: String,
    pub ordered_quantity: Micros,
    pub cumulative_filled: Micros,
}

impl std::fmt::Display for OverfillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "overfill on order {}: cumulative filled {} exceeds ordered {}",
            self.client_order_id, self.cumulative_filled, self.ordered_quantity
        )
    }
}

impl std::error::Error for OverfillError {}
