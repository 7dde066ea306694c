#[derive(Debug)]
pub enum CheckpointError {
    Io(std::io::Error),
    WorkerStopped,
    Serde(serde_json::Error),
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "checkpoint io error: {err}"),
            Self::WorkerStopped => write!(f, "checkpoint worker thread has stopped accepting jobs"),
            Self::Serde(err) => write!(f, "checkpoint serialization error: {err}"),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<std::io::Error> for CheckpointError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CheckpointError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err)
    }
}
