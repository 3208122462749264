//! Response DTOs for the web API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::file::FileRecord;

/// Response body for a successful upload.
#[derive(Debug, Serialize)]
pub struct FileCreated {
    /// Original filename.
    pub name: String,
    /// Retrieval path for the stored file.
    pub uri: String,
}

impl FileCreated {
    /// Build the response from a record, rendering its uri as the
    /// retrieval path.
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            uri: format!("/files/{}", record.uri),
        }
    }
}

/// One entry in the file listing.
#[derive(Debug, Serialize)]
pub struct FileInfo {
    /// Public identifier.
    pub uri: String,
    /// Original filename.
    pub name: String,
    /// Upload timestamp.
    pub uploaded_on: DateTime<Utc>,
    /// Owning user.
    pub user_id: i64,
}

impl From<FileRecord> for FileInfo {
    fn from(record: FileRecord) -> Self {
        Self {
            uri: record.uri,
            name: record.name,
            uploaded_on: record.uploaded_on,
            user_id: record.user_id,
        }
    }
}
