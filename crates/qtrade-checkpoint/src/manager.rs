use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::CheckpointError;
use crate::job::CheckpointJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The worker drained every queued job before the timeout elapsed.
    Drained,
    /// The timeout elapsed with jobs still outstanding; the worker thread
    /// keeps running in the background to finish them.
    TimedOut,
}

/// Owns a bounded `mpsc` queue and a single worker thread that applies
/// checkpoint writes atomically, one at a time, off the caller's thread.
///
/// Backpressure: `enqueue` blocks once the queue is full, rather than
/// dropping snapshots silently — a session producing checkpoints faster
/// than disk IO can absorb them should slow down, not lose state.
pub struct CheckpointManager {
    dir: PathBuf,
    sender: SyncSender<CheckpointJob>,
    handle: Option<JoinHandle<()>>,
    drained: Arc<AtomicBool>,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>, queue_capacity: usize) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let (sender, receiver) = mpsc::sync_channel::<CheckpointJob>(queue_capacity);
        let drained = Arc::new(AtomicBool::new(false));
        let worker_dir = dir.clone();
        let worker_drained = Arc::clone(&drained);

        let handle = thread::spawn(move || {
            for job in receiver.iter() {
                let path = worker_dir.join(format!("{}.json", job.name));
                if let Err(err) = qtrade_core::write_atomic(&path, &job.payload) {
                    tracing::error!(checkpoint = %job.name, error = %err, "checkpoint write failed");
                } else {
                    tracing::debug!(checkpoint = %job.name, "checkpoint written");
                }
            }
            worker_drained.store(true, Ordering::SeqCst);
        });

        Ok(Self {
            dir,
            sender,
            handle: Some(handle),
            drained,
        })
    }

    /// Serialize `value` and enqueue it under `name` (written as
    /// `<dir>/<name>.json`). Blocks if the queue is at capacity.
    pub fn save<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<(), CheckpointError> {
        let payload = serde_json::to_vec_pretty(value)?;
        self.sender
            .send(CheckpointJob {
                name: name.to_string(),
                payload,
            })
            .map_err(|_| CheckpointError::WorkerStopped)
    }

    /// Read back the most recently committed snapshot for `name`, if any.
    /// Synchronous and bypasses the queue — used at startup before the
    /// worker thread has anything to race against.
    pub fn load<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<Option<T>, CheckpointError> {
        let path = self.dir.join(format!("{name}.json"));
        match qtrade_core::read_if_exists(&path)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Close the queue and wait up to `timeout` for the worker to drain
    /// every already-enqueued job. Returns [`ShutdownOutcome::TimedOut`] if
    /// jobs are still outstanding when the timeout elapses; the worker
    /// keeps running regardless; it is never forcibly killed mid-write.
    pub fn shutdown(self, timeout: Duration) -> ShutdownOutcome {
        let CheckpointManager {
            sender,
            mut handle,
            drained,
            ..
        } = self;
        drop(sender);

        let deadline = Instant::now() + timeout;
        while !drained.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }

        let finished = drained.load(Ordering::SeqCst);
        if let Some(handle) = handle.take() {
            if finished {
                let _ = handle.join();
            }
        }

        if finished {
            ShutdownOutcome::Drained
        } else {
            ShutdownOutcome::TimedOut
        }
    }
}
