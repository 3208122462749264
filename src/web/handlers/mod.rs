//! API handlers for the web boundary.

pub mod file;

pub use file::*;

use crate::db::Database;
use crate::file::{BlobStore, FileService};
use crate::quota::{QuotaPolicy, UserLocks};

/// Shared state for all handlers.
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Blob storage.
    pub store: BlobStore,
    /// Per-user lock table.
    pub locks: UserLocks,
    /// Quota limits in effect.
    pub policy: QuotaPolicy,
    /// The single tenant every request is attributed to.
    pub user_id: i64,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(db: Database, store: BlobStore, policy: QuotaPolicy, user_id: i64) -> Self {
        Self {
            db,
            store,
            locks: UserLocks::new(),
            policy,
            user_id,
        }
    }

    /// Build a file service over this state.
    pub fn file_service(&self) -> FileService<'_> {
        FileService::new(&self.db, &self.store, &self.locks).with_policy(self.policy)
    }
}
