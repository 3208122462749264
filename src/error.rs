//! Error types for depot.

use thiserror::Error;

/// Common error type for depot operations.
#[derive(Error, Debug)]
pub enum DepotError {
    /// The user already holds the maximum number of files.
    #[error("file rejected, too many files already ({max_files})")]
    QuotaExceeded {
        /// The per-user file limit in effect.
        max_files: i64,
    },

    /// An uploaded stream exceeded the size ceiling mid-write.
    #[error("file too large, cannot exceed {max_bytes} bytes")]
    SizeExceeded {
        /// The size ceiling in bytes.
        max_bytes: u64,
    },

    /// The user exhausted their per-minute download byte budget.
    #[error("byte rate exceeded, wait for the next minute to download")]
    RateLimited,

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A record with the same (owner, name) pair already exists.
    ///
    /// Internal: the orchestrator converts this into an idempotent return
    /// of the existing record; it never reaches the boundary.
    #[error("a file with this name already exists for this user")]
    UniquenessViolation,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error.
    ///
    /// Wraps persistence failures from sqlx; the operation that produced
    /// it must be treated as failed in its entirety.
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for DepotError {
    fn from(e: sqlx::Error) -> Self {
        DepotError::Database(e.to_string())
    }
}

/// Result type alias for depot operations.
pub type Result<T> = std::result::Result<T, DepotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exceeded_display() {
        let err = DepotError::QuotaExceeded { max_files: 2 };
        assert_eq!(err.to_string(), "file rejected, too many files already (2)");
    }

    #[test]
    fn test_size_exceeded_display() {
        let err = DepotError::SizeExceeded {
            max_bytes: 31_457_280,
        };
        assert_eq!(
            err.to_string(),
            "file too large, cannot exceed 31457280 bytes"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = DepotError::NotFound("file".to_string());
        assert_eq!(err.to_string(), "file not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DepotError = io_err.into();
        assert!(matches!(err, DepotError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(DepotError::RateLimited)
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
