//! qtrade-capital
//!
//! Compounding vs. fixed-capital-with-scheduled-withdrawal modes.

mod ledger;
mod types;

pub use ledger::{maybe_withdraw, CapitalLedger};
pub use types::{CapitalMode, WithdrawalFrequency, WithdrawalRecord};
