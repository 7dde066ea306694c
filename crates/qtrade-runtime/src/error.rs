use qtrade_portfolio::PortfolioError;

#[derive(Debug)]
pub enum CoordinatorError {
    /// `start()` called outside `CoordinatorState::Init`, or `on_bar`/
    /// `on_fill` called outside `CoordinatorState::Running`.
    WrongState { expected: &'static str },
    Broker(Box<dyn std::error::Error + Send + Sync>),
    Portfolio(PortfolioError),
    Checkpoint(qtrade_checkpoint::CheckpointError),
}

impl std::fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongState { expected } => write!(f, "coordinator not in expected state: {expected}"),
            Self::Broker(err) => write!(f, "broker error: {err}"),
            Self::Portfolio(err) => write!(f, "portfolio error: {err}"),
            Self::Checkpoint(err) => write!(f, "checkpoint error: {err}"),
        }
    }
}

impl std::error::Error for CoordinatorError {}

impl From<PortfolioError> for CoordinatorError {
    fn from(err: PortfolioError) -> Self {
        Self::Portfolio(err)
    }
}

impl From<qtrade_checkpoint::CheckpointError> for CoordinatorError {
    fn from(err: qtrade_checkpoint::CheckpointError) -> Self {
        Self::Checkpoint(err)
    }
}
