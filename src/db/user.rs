//! User model and repository for depot.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{DepotError, Result};

/// A registered user together with its quota counters.
///
/// The counters are mutated only by the quota ledger while the user's
/// lock is held.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Number of files this user has uploaded.
    pub files_uploaded: i64,
    /// Timestamp of the most recent download.
    pub last_download_time: DateTime<Utc>,
    /// Bytes downloaded inside the current fixed one-minute window.
    pub bytes_read_on_last_minute: i64,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address.
    pub email: String,
}

impl NewUser {
    /// Create a new NewUser.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user with zeroed counters.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (email, files_uploaded, last_download_time, bytes_read_on_last_minute)
             VALUES (?, 0, ?, 0)",
        )
        .bind(&new_user.email)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, email, files_uploaded, last_download_time, bytes_read_on_last_minute, created_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Get a user by email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, email, files_uploaded, last_download_time, bytes_read_on_last_minute, created_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Get the user with the given email, creating it if absent.
    ///
    /// Used by the single-tenant bootstrap at startup.
    pub async fn ensure(&self, email: &str) -> Result<User> {
        if let Some(user) = self.get_by_email(email).await? {
            return Ok(user);
        }
        self.create(&NewUser::new(email)).await
    }
}
