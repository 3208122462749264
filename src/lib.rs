//! depot - Single-tenant file storage with quotas.
//!
//! Clients upload files, list them, and download them by identifier,
//! subject to two per-user policies: a maximum file count and a
//! bytes-downloaded-per-minute budget. Quota checks and the mutations
//! they authorize are serialized through a per-user lock.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod quota;
pub mod web;

pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{DepotError, Result};
pub use file::{BlobStore, FileCatalog, FileRecord, FileService, NewFileRecord};
pub use quota::{QuotaLedger, QuotaPolicy, UserLocks};
