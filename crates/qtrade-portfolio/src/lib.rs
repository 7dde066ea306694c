//! qtrade-portfolio
//!
//! Weighted-average cost-basis position accounting behind a mutex-guarded
//! facade: [`Portfolio`]. One fill applies one of four cases — open,
//! increase, reduce, or reverse — see [`accounting::apply_fill`].

mod accounting;
mod error;
mod ledger;
mod types;

pub use accounting::{apply_fill, equity, unrealized_pnl, verify_integrity};
pub use error::PortfolioError;
pub use ledger::Portfolio;
pub use types::{CashEntry, MarkMap, PortfolioSnapshot, PortfolioState, TradeLogEntry};
