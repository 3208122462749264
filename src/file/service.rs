//! File service for depot.
//!
//! The orchestrator for uploads and downloads: composes the blob store,
//! the file catalog and the quota ledger under the owning user's lock so
//! quota checks and the mutations they authorize never interleave.

use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use futures::Stream;

use crate::db::Database;
use crate::quota::{QuotaLedger, QuotaPolicy, UserLocks};
use crate::{DepotError, Result};

use super::catalog::{FileCatalog, FileRecord, NewFileRecord};
use super::storage::BlobStore;

/// File service orchestrating uploads and downloads.
pub struct FileService<'a> {
    db: &'a Database,
    store: &'a BlobStore,
    locks: &'a UserLocks,
    policy: QuotaPolicy,
}

impl<'a> FileService<'a> {
    /// Create a new FileService with the default quota policy.
    pub fn new(db: &'a Database, store: &'a BlobStore, locks: &'a UserLocks) -> Self {
        Self {
            db,
            store,
            locks,
            policy: QuotaPolicy::default(),
        }
    }

    /// Create a new FileService with a custom quota policy.
    pub fn with_policy(mut self, policy: QuotaPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upload a byte stream under the given name for the given user.
    ///
    /// Holding the user's lock: checks the upload quota, stores the blob,
    /// then either returns the existing record for this (owner, name)
    /// unchanged (idempotent re-upload; the just-written duplicate blob
    /// stays behind as an orphan) or inserts a new record and increments
    /// the user's file count. Blob store failures (`SizeExceeded`, `Io`)
    /// abort before any catalog or ledger mutation.
    pub async fn upload<S>(&self, user_id: i64, filename: &str, stream: S) -> Result<FileRecord>
    where
        S: Stream<Item = io::Result<Bytes>>,
    {
        let ledger = QuotaLedger::new(self.db.pool(), self.policy);
        let catalog = FileCatalog::new(self.db.pool());

        let lock = self.locks.lock_for(user_id);
        let _guard = lock.lock().await;

        if !ledger.can_upload(user_id).await? {
            return Err(DepotError::QuotaExceeded {
                max_files: self.policy.max_files_per_user,
            });
        }

        let (uri, size) = self.store.store(stream).await?;

        if let Some(existing) = catalog.find_by_owner_and_name(user_id, filename).await? {
            tracing::debug!(
                user_id,
                filename,
                uri = %existing.uri,
                "re-upload of existing file, returning original record"
            );
            return Ok(existing);
        }

        let record = match catalog
            .insert(&NewFileRecord::new(uri.to_string(), filename, size, user_id))
            .await
        {
            Ok(record) => record,
            // Lost the race against a concurrent insert of the same name;
            // the winner's record is the answer.
            Err(DepotError::UniquenessViolation) => {
                return catalog
                    .find_by_owner_and_name(user_id, filename)
                    .await?
                    .ok_or_else(|| DepotError::NotFound("file".to_string()));
            }
            Err(e) => return Err(e),
        };

        ledger.increase_file_count(user_id).await?;

        tracing::info!(user_id, filename, uri = %record.uri, size, "file uploaded");

        Ok(record)
    }

    /// Resolve a download for the given user.
    ///
    /// Holding the user's lock: checks the download rate limit, selects
    /// the first matching record (insertion order; `uri` narrows the
    /// match), charges the record's size against the window counter, and
    /// returns the blob's location together with the record.
    pub async fn download(
        &self,
        user_id: i64,
        uri: Option<&str>,
    ) -> Result<(PathBuf, FileRecord)> {
        let ledger = QuotaLedger::new(self.db.pool(), self.policy);
        let catalog = FileCatalog::new(self.db.pool());

        let lock = self.locks.lock_for(user_id);
        let _guard = lock.lock().await;

        if !ledger.can_download(user_id).await? {
            return Err(DepotError::RateLimited);
        }

        let files = catalog.find_by_owner(user_id, uri).await?;
        let record = files
            .into_iter()
            .next()
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        ledger.record_download(user_id, record.size).await?;

        tracing::debug!(user_id, uri = %record.uri, size = record.size, "download recorded");

        Ok((self.store.path_for(&record.uri), record))
    }

    /// List all files of the given user in insertion order.
    ///
    /// Read-only; touches no counters and takes no lock.
    pub async fn list(&self, user_id: i64) -> Result<Vec<FileRecord>> {
        FileCatalog::new(self.db.pool()).find_by_owner(user_id, None).await
    }
}
