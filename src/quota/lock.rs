//! Per-user exclusive sections.
//!
//! Every quota-check-then-mutate sequence for one user must run under the
//! same lock, the in-process equivalent of a locked row read in the
//! backing store. Locks are keyed by user id so requests for different
//! users never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

/// Keyed mutex handing out one async lock per user id.
///
/// The returned guard is RAII: it releases on every exit path, including
/// error returns.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for the given user, creating it on first use.
    pub fn lock_for(&self, user_id: i64) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
