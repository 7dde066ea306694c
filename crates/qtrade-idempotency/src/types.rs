//! Serializable on-disk shape of the idempotency table.

use std::collections::HashMap;

use qtrade_core::UtcInstant;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdempotencySnapshot {
    pub submissions: HashMap<String, UtcInstant>,
}
