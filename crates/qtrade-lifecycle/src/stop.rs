use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Manual,
    EodFlatten,
}

/// Thread-safe, idempotent stop request flag. `request_stop` may be called
/// from any thread (signal handler, CLI command, coordinator loop); the
/// first call wins, subsequent calls are no-ops.
#[derive(Default)]
pub struct StopController {
    requested: AtomicBool,
    reason: Mutex<Option<StopReason>>,
}

impl StopController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this call is the one that actually set the flag
    /// (i.e. the first request).
    pub fn request_stop(&self, reason: StopReason) -> bool {
        let first = !self.requested.swap(true, Ordering::SeqCst);
        if first {
            *self.reason.lock().expect("stop controller mutex poisoned") = Some(reason);
        }
        first
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn reason(&self) -> Option<StopReason> {
        *self.reason.lock().expect("stop controller mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_wins_and_sets_reason() {
        let controller = StopController::new();
        assert!(controller.request_stop(StopReason::Manual));
        assert!(!controller.request_stop(StopReason::EodFlatten));
        assert_eq!(controller.reason(), Some(StopReason::Manual));
    }

    #[test]
    fn not_requested_until_called() {
        let controller = StopController::new();
        assert!(!controller.is_stop_requested());
        controller.request_stop(StopReason::Manual);
        assert!(controller.is_stop_requested());
    }
}
