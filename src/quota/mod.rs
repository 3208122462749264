//! Per-user quota accounting for depot.
//!
//! Two independent policies govern each user:
//! - an upload quota (maximum number of files held), and
//! - a download rate limit (byte budget per fixed one-minute window).
//!
//! The counters live on the user row. Callers must hold the user's lock
//! (see [`UserLocks`]) across any check and the mutation it authorizes.

mod lock;

pub use lock::UserLocks;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::config::QuotaConfig;
use crate::db::{User, UserRepository};
use crate::{DepotError, Result};

/// Default maximum number of files one user may hold.
pub const DEFAULT_MAX_FILES_PER_USER: i64 = 2;

/// Default download byte budget per window (1 MiB).
pub const DEFAULT_MAX_BYTES_PER_MINUTE: i64 = 1024 * 1024;

/// Length of the fixed rate-limit window in seconds.
pub const RATE_WINDOW_SECS: i64 = 60;

/// Tunable quota limits.
#[derive(Debug, Clone, Copy)]
pub struct QuotaPolicy {
    /// Maximum number of files one user may hold.
    pub max_files_per_user: i64,
    /// Download byte budget per fixed one-minute window.
    pub max_bytes_per_minute: i64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            max_files_per_user: DEFAULT_MAX_FILES_PER_USER,
            max_bytes_per_minute: DEFAULT_MAX_BYTES_PER_MINUTE,
        }
    }
}

impl From<&QuotaConfig> for QuotaPolicy {
    fn from(config: &QuotaConfig) -> Self {
        Self {
            max_files_per_user: config.max_files_per_user,
            max_bytes_per_minute: config.max_bytes_per_minute,
        }
    }
}

/// Ledger of per-user quota counters.
pub struct QuotaLedger<'a> {
    pool: &'a SqlitePool,
    policy: QuotaPolicy,
}

impl<'a> QuotaLedger<'a> {
    /// Create a ledger over the given pool with the given limits.
    pub fn new(pool: &'a SqlitePool, policy: QuotaPolicy) -> Self {
        Self { pool, policy }
    }

    /// The limits this ledger enforces.
    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    async fn load_user(&self, user_id: i64) -> Result<User> {
        UserRepository::new(self.pool)
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| DepotError::NotFound("user".to_string()))
    }

    /// Whether the user may upload one more file.
    ///
    /// The answer is stale the moment the user's lock is released; callers
    /// hold the lock across this check and the matching
    /// [`increase_file_count`](Self::increase_file_count).
    pub async fn can_upload(&self, user_id: i64) -> Result<bool> {
        let user = self.load_user(user_id).await?;
        Ok(user.files_uploaded < self.policy.max_files_per_user)
    }

    /// Whether the user may download right now.
    ///
    /// Fixed-window limiter: when at least [`RATE_WINDOW_SECS`] have
    /// elapsed since the last download, the byte counter resets to zero
    /// and the download is allowed. Inside the window the download is
    /// allowed while the counter has not passed the budget. A burst
    /// straddling the window edge can exceed the budget; that edge is
    /// deliberate fixed-window behavior.
    pub async fn can_download(&self, user_id: i64) -> Result<bool> {
        let user = self.load_user(user_id).await?;

        let elapsed = Utc::now().signed_duration_since(user.last_download_time);
        if elapsed >= Duration::seconds(RATE_WINDOW_SECS) {
            self.reset_counter(user_id).await?;
            return Ok(true);
        }

        Ok(user.bytes_read_on_last_minute <= self.policy.max_bytes_per_minute)
    }

    /// Increment the user's file count by one.
    pub async fn increase_file_count(&self, user_id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE users SET files_uploaded = files_uploaded + 1 WHERE id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DepotError::NotFound("user".to_string()));
        }

        Ok(())
    }

    /// Add downloaded bytes to the window counter and refresh the
    /// last-download timestamp.
    pub async fn record_download(&self, user_id: i64, bytes: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users
             SET bytes_read_on_last_minute = bytes_read_on_last_minute + ?,
                 last_download_time = ?
             WHERE id = ?",
        )
        .bind(bytes)
        .bind(Utc::now())
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DepotError::NotFound("user".to_string()));
        }

        Ok(())
    }

    /// Reset the window byte counter to zero.
    pub async fn reset_counter(&self, user_id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET bytes_read_on_last_minute = 0 WHERE id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser};

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("quota@test"))
            .await
            .unwrap();
        (db, user.id)
    }

    async fn backdate_last_download(db: &Database, user_id: i64, secs: i64) {
        sqlx::query("UPDATE users SET last_download_time = ? WHERE id = ?")
            .bind(Utc::now() - Duration::seconds(secs))
            .bind(user_id)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_can_upload_under_limit() {
        let (db, user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        assert!(ledger.can_upload(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_upload_at_limit() {
        let (db, user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        ledger.increase_file_count(user_id).await.unwrap();
        assert!(ledger.can_upload(user_id).await.unwrap());

        ledger.increase_file_count(user_id).await.unwrap();
        assert!(!ledger.can_upload(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_upload_unknown_user() {
        let (db, _user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        let result = ledger.can_upload(9999).await;
        assert!(matches!(result, Err(DepotError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_increase_file_count_unknown_user() {
        let (db, _user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        let result = ledger.increase_file_count(9999).await;
        assert!(matches!(result, Err(DepotError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_can_download_fresh_user() {
        let (db, user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        assert!(ledger.can_download(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_download_within_window_under_budget() {
        let (db, user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        ledger.record_download(user_id, 512 * 1024).await.unwrap();
        assert!(ledger.can_download(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_download_counter_at_exact_budget_still_allowed() {
        let (db, user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        ledger
            .record_download(user_id, DEFAULT_MAX_BYTES_PER_MINUTE)
            .await
            .unwrap();

        // Comparison is inclusive: a counter sitting exactly on the budget
        // still admits one more download.
        assert!(ledger.can_download(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_can_download_over_budget_denied() {
        let (db, user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        ledger
            .record_download(user_id, DEFAULT_MAX_BYTES_PER_MINUTE + 1)
            .await
            .unwrap();

        assert!(!ledger.can_download(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_window_lapse_resets_counter() {
        let (db, user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        ledger
            .record_download(user_id, DEFAULT_MAX_BYTES_PER_MINUTE + 1)
            .await
            .unwrap();
        assert!(!ledger.can_download(user_id).await.unwrap());

        backdate_last_download(&db, user_id, RATE_WINDOW_SECS + 1).await;

        assert!(ledger.can_download(user_id).await.unwrap());

        let user = UserRepository::new(db.pool())
            .get_by_id(user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.bytes_read_on_last_minute, 0);
    }

    #[tokio::test]
    async fn test_record_download_accumulates_and_refreshes_timestamp() {
        let (db, user_id) = setup().await;
        let ledger = QuotaLedger::new(db.pool(), QuotaPolicy::default());

        backdate_last_download(&db, user_id, 30).await;
        let before = UserRepository::new(db.pool())
            .get_by_id(user_id)
            .await
            .unwrap()
            .unwrap();

        ledger.record_download(user_id, 100).await.unwrap();
        ledger.record_download(user_id, 200).await.unwrap();

        let after = UserRepository::new(db.pool())
            .get_by_id(user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.bytes_read_on_last_minute, 300);
        assert!(after.last_download_time > before.last_download_time);
    }

    #[tokio::test]
    async fn test_custom_policy() {
        let (db, user_id) = setup().await;
        let policy = QuotaPolicy {
            max_files_per_user: 1,
            max_bytes_per_minute: 10,
        };
        let ledger = QuotaLedger::new(db.pool(), policy);

        ledger.increase_file_count(user_id).await.unwrap();
        assert!(!ledger.can_upload(user_id).await.unwrap());

        ledger.record_download(user_id, 11).await.unwrap();
        assert!(!ledger.can_download(user_id).await.unwrap());
    }
}
