//! Blob storage for depot.
//!
//! Blobs live in a flat directory, one file per blob, named by a
//! generated UUID. Writes are streamed chunk by chunk with the size
//! ceiling enforced mid-stream, so an oversized upload is rejected
//! without ever holding the whole payload in memory.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{DepotError, Result};

use super::DEFAULT_MAX_BLOB_SIZE;

/// Blob store rooted at a directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    /// Base directory for blob files.
    root: PathBuf,
    /// Size ceiling for a single blob in bytes.
    max_blob_size: u64,
}

impl BlobStore {
    /// Create a new BlobStore with the given root directory.
    ///
    /// The directory will be created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        })
    }

    /// Create a new BlobStore with a custom size ceiling.
    pub fn with_max_blob_size(mut self, max_blob_size: u64) -> Self {
        self.max_blob_size = max_blob_size;
        self
    }

    /// Get the root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the configured size ceiling.
    pub fn max_blob_size(&self) -> u64 {
        self.max_blob_size
    }

    /// Persist a stream of chunks under a fresh UUID.
    ///
    /// Each chunk is written as it arrives; the accumulated byte count is
    /// checked against the ceiling before the chunk is written. Exceeding
    /// the ceiling aborts with `SizeExceeded`, a failing chunk or write
    /// aborts with `Io`. In both cases the partially written file stays
    /// behind as an orphan blob that nothing references.
    ///
    /// Returns the generated id and the number of bytes written.
    pub async fn store<S>(&self, stream: S) -> Result<(Uuid, i64)>
    where
        S: Stream<Item = io::Result<Bytes>>,
    {
        let uri = Uuid::new_v4();
        let path = self.root.join(uri.to_string());

        let mut out = fs::File::create(&path).await?;
        let mut written: u64 = 0;

        futures::pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.max_blob_size {
                return Err(DepotError::SizeExceeded {
                    max_bytes: self.max_blob_size,
                });
            }
            out.write_all(&chunk).await?;
        }
        out.flush().await?;

        Ok((uri, written as i64))
    }

    /// Get the filesystem location of a stored blob.
    pub fn path_for(&self, uri: &str) -> PathBuf {
        self.root.join(uri)
    }

    /// Load blob content.
    pub async fn read(&self, uri: &str) -> Result<Vec<u8>> {
        match fs::read(self.path_for(uri)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::NotFound(format!("blob {uri}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists in the store.
    pub fn exists(&self, uri: &str) -> bool {
        self.path_for(uri).exists()
    }
}
