//! Idempotency tracker error type.

#[derive(Debug)]
pub enum IdempotencyError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl std::fmt::Display for IdempotencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "idempotency store io error: {e}"),
            Self::Serde(e) => write!(f, "idempotency store serialization error: {e}"),
        }
    }
}

impl std::error::Error for IdempotencyError {}

impl From<std::io::Error> for IdempotencyError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for IdempotencyError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e)
    }
}
