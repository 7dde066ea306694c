//! The coordinator's top-level lifecycle state machine.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CoordinatorState {
    Init,
    Starting,
    Running,
    Stopping,
    Stopped,
}
