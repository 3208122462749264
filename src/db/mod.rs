//! Database module for depot.
//!
//! This module provides SQLite connectivity through sqlx and sequential
//! migration management.

mod schema;
mod user;

pub use schema::MIGRATIONS;
pub use user::{NewUser, User, UserRepository};

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::Result;

/// Database wrapper managing the SQLite pool and migrations.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a database at the specified path.
    ///
    /// If the database file doesn't exist, it will be created.
    /// Migrations are automatically applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database at {:?}", path);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Open an in-memory database for testing.
    ///
    /// The pool is pinned to a single connection: every connection to
    /// `:memory:` gets its own database, so the pool must never rotate.
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory database");

        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the current schema version.
    pub async fn schema_version(&self) -> Result<i64> {
        let table_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        )
        .fetch_one(&self.pool)
        .await?;

        if !table_exists {
            return Ok(0);
        }

        let version: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
            .fetch_one(&self.pool)
            .await?;

        Ok(version)
    }

    /// Apply pending migrations.
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version    INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        let current = self.schema_version().await?;

        for (idx, migration) in MIGRATIONS.iter().enumerate() {
            let version = (idx + 1) as i64;
            if version <= current {
                continue;
            }

            debug!("Applying migration v{}", version);
            sqlx::raw_sql(migration).execute(&self.pool).await?;
            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(version)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::open_in_memory().await.unwrap();
        let version = db.schema_version().await.unwrap();
        assert_eq!(version, MIGRATIONS.len() as i64);
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        // A second run applies nothing and fails nothing
        db.migrate().await.unwrap();
        assert_eq!(
            db.schema_version().await.unwrap(),
            MIGRATIONS.len() as i64
        );
    }

    #[tokio::test]
    async fn test_open_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("depot.db");

        let db = Database::open(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(
            db.schema_version().await.unwrap(),
            MIGRATIONS.len() as i64
        );
    }
}
