//! File management module for depot.
//!
//! This module provides the upload/download core:
//! - streamed, size-capped blob storage with UUID naming
//! - the file catalog with its per-owner name uniqueness
//! - the orchestrating service that composes both under the user's lock

mod catalog;
mod service;
mod storage;

pub use catalog::{FileCatalog, FileRecord, NewFileRecord};
pub use service::FileService;
pub use storage::BlobStore;

/// Default ceiling for one uploaded blob (30 MiB).
pub const DEFAULT_MAX_BLOB_SIZE: u64 = 30 * 1024 * 1024;
