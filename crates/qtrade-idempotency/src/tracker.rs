//! TTL-based client-order-id deduplication.
//!
//! Order-with-the-coordinator contract (spec): the duplicate check must run
//! *before* risk accounting so a retry never consumes rate-limit budget, and
//! `mark_submitted` must run *after* the broker has accepted the order, so a
//! submission that never left the process is never "marked".

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use qtrade_core::UtcInstant;

use crate::error::IdempotencyError;
use crate::types::IdempotencySnapshot;

pub struct IdempotencyTracker {
    ttl_seconds: i64,
    persist_path: Option<PathBuf>,
    submissions: Mutex<HashMap<String, UtcInstant>>,
}

impl IdempotencyTracker {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            ttl_seconds,
            persist_path: None,
            submissions: Mutex::new(HashMap::new()),
        }
    }

    /// Loads any existing on-disk table at `path` (atomic read under the
    /// tracker's lock), then binds `path` as the write target for future
    /// `mark_submitted` calls.
    pub fn with_persistence(ttl_seconds: i64, path: impl AsRef<Path>) -> Result<Self, IdempotencyError> {
        let path = path.as_ref().to_path_buf();
        let submissions = match qtrade_core::read_if_exists(&path)? {
            Some(bytes) => serde_json::from_slice::<IdempotencySnapshot>(&bytes)?.submissions,
            None => HashMap::new(),
        };
        Ok(Self {
            ttl_seconds,
            persist_path: Some(path),
            submissions: Mutex::new(submissions),
        })
    }

    /// `true` iff `client_order_id` was marked submitted within the TTL
    /// window of `now`.
    pub fn is_duplicate(&self, client_order_id: &str, now: UtcInstant) -> bool {
        let submissions = self.submissions.lock().expect("idempotency mutex poisoned");
        match submissions.get(client_order_id) {
            Some(&submitted_at) => now.duration_since(submitted_at).num_seconds() < self.ttl_seconds,
            None => false,
        }
    }

    /// Records a submission and, if a persistence path is configured,
    /// writes the updated table atomically before returning.
    pub fn mark_submitted(&self, client_order_id: &str, at: UtcInstant) -> Result<(), IdempotencyError> {
        let snapshot = {
            let mut submissions = self.submissions.lock().expect("idempotency mutex poisoned");
            submissions.insert(client_order_id.to_string(), at);
            IdempotencySnapshot {
                submissions: submissions.clone(),
            }
        };
        if let Some(path) = &self.persist_path {
            let bytes = serde_json::to_vec_pretty(&snapshot)?;
            qtrade_core::write_atomic(path, &bytes)?;
        }
        Ok(())
    }

    /// Drops entries older than `ttl_seconds` as of `now`. Not required for
    /// correctness (`is_duplicate` already ignores expired entries) but
    /// bounds memory growth over a long-running session.
    pub fn sweep_expired(&self, now: UtcInstant) {
        let mut submissions = self.submissions.lock().expect("idempotency mutex poisoned");
        submissions.retain(|_, &mut submitted_at| {
            now.duration_since(submitted_at).num_seconds() < self.ttl_seconds
        });
    }

    pub fn len(&self) -> usize {
        self.submissions.lock().expect("idempotency mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
