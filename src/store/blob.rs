//! Blob storage for archive bytes.
//!
//! Each artifact has exactly one current blob at `<root>/<id>/<id>`.
//! Writes replace it atomically.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::archive::fingerprint_reader;
use crate::error::{Error, Result};
use crate::store::atomic::write_atomic;

/// Durable byte storage keyed by artifact id.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Create or replace the blob for `id`.
    async fn write(&self, id: Uuid, bytes: &[u8]) -> Result<()>;

    /// Read the blob for `id`, failing with [`Error::BlobNotFound`] when absent.
    async fn read(&self, id: Uuid) -> Result<Vec<u8>>;

    /// Fingerprint of the stored blob, failing with [`Error::BlobNotFound`] when absent.
    async fn digest(&self, id: Uuid) -> Result<String>;
}

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a blob store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Directory holding the blob for `id`.
    pub fn blob_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Full path of the blob for `id`.
    pub fn blob_path(&self, id: Uuid) -> PathBuf {
        self.blob_dir(id).join(id.to_string())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(&self, id: Uuid, bytes: &[u8]) -> Result<()> {
        let dir = self.blob_dir(id);
        fs::create_dir_all(&dir).await?;
        write_atomic(&self.blob_path(id), bytes).await?;
        info!("Stored blob for artifact {} ({} bytes)", id, bytes.len());
        Ok(())
    }

    async fn read(&self, id: Uuid) -> Result<Vec<u8>> {
        match fs::read(self.blob_path(id)).await {
            Ok(bytes) => {
                debug!("Read blob for artifact {} ({} bytes)", id, bytes.len());
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::BlobNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn digest(&self, id: Uuid) -> Result<String> {
        match fs::File::open(self.blob_path(id)).await {
            Ok(file) => fingerprint_reader(file).await,
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::BlobNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}
