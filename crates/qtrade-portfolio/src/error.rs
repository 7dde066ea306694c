//! Portfolio error type.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioError {
    /// A cash withdrawal would drive the balance negative.
    InsufficientCash { requested: String, available: String },
    /// `get_equity` was called without a mark for a held symbol.
    MissingMarkPrice(String),
    /// Internal invariant: a position expected to exist was missing from
    /// the map mid-fill. Indicates a bug in the accounting state machine,
    /// not a user error.
    MissingPosition(String),
    /// `verify_integrity`'s replay diverged from recorded state.
    IntegrityViolation(String),
    /// Cumulative fills for an order exceeded its original quantity. Raised
    /// by the caller tracking per-order fill totals, not by the ledger
    /// arithmetic itself — fatal, the session halts on receipt.
    Overfill {
        client_order_id: String,
        ordered_quantity: String,
        cumulative_filled: String,
    },
}

impl std::fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientCash { requested, available } => write!(
                f,
                "insufficient cash: requested {requested}, available {available}"
            ),
            Self::MissingMarkPrice(symbol) => {
                write!(f, "missing mark price for held symbol {symbol}")
            }
            Self::MissingPosition(symbol) => {
                write!(f, "expected open position for {symbol} not found")
            }
            Self::IntegrityViolation(detail) => write!(f, "ledger integrity violation: {detail}"),
            Self::Overfill {
                client_order_id,
                ordered_quantity,
                cumulative_filled,
            } => write!(
                f,
                "overfill on order {client_order_id}: cumulative filled {cumulative_filled} exceeds ordered {ordered_quantity}"
            ),
        }
    }
}

impl std::error::Error for PortfolioError {}
