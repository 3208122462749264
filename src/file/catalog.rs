//! File catalog types and repository for depot.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{DepotError, Result};

/// Metadata entry describing one stored blob.
///
/// Records are immutable after creation and never deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Internal row id; carries the insertion order.
    pub id: i64,
    /// Public identifier, also the blob's name in the store.
    pub uri: String,
    /// Original filename as uploaded.
    pub name: String,
    /// Blob size in bytes.
    pub size: i64,
    /// Owning user.
    pub user_id: i64,
    /// When the file was uploaded.
    pub uploaded_on: DateTime<Utc>,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Public identifier (generated by the blob store).
    pub uri: String,
    /// Original filename.
    pub name: String,
    /// Blob size in bytes.
    pub size: i64,
    /// Owning user.
    pub user_id: i64,
}

impl NewFileRecord {
    /// Create a new NewFileRecord.
    pub fn new(uri: impl Into<String>, name: impl Into<String>, size: i64, user_id: i64) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            size,
            user_id,
        }
    }
}

/// Repository for file catalog operations.
pub struct FileCatalog<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileCatalog<'a> {
    /// Create a new FileCatalog with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new file record.
    ///
    /// Fails with `UniquenessViolation` if a record with the same
    /// (owner, name) pair already exists; callers treat that as "file
    /// already exists", not as a hard failure.
    pub async fn insert(&self, file: &NewFileRecord) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (uri, name, size, user_id, uploaded_on)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&file.uri)
        .bind(&file.name)
        .bind(file.size)
        .bind(file.user_id)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => DepotError::UniquenessViolation,
            _ => DepotError::Database(e.to_string()),
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))
    }

    /// Get a record by internal id.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(
            "SELECT id, uri, name, size, user_id, uploaded_on
             FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Find an owner's record by filename.
    pub async fn find_by_owner_and_name(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(
            "SELECT id, uri, name, size, user_id, uploaded_on
             FROM files WHERE user_id = ? AND name = ?",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// List an owner's records, optionally filtered by uri.
    ///
    /// An empty filter returns all of the owner's files. Results are in
    /// insertion order.
    pub async fn find_by_owner(&self, user_id: i64, uri: Option<&str>) -> Result<Vec<FileRecord>> {
        let records = match uri {
            Some(uri) => {
                sqlx::query_as::<_, FileRecord>(
                    "SELECT id, uri, name, size, user_id, uploaded_on
                     FROM files WHERE user_id = ? AND uri = ? ORDER BY id ASC",
                )
                .bind(user_id)
                .bind(uri)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, FileRecord>(
                    "SELECT id, uri, name, size, user_id, uploaded_on
                     FROM files WHERE user_id = ? ORDER BY id ASC",
                )
                .bind(user_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(records)
    }

    /// Count an owner's records.
    pub async fn count_by_owner(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
