//! Object storage for memorial media.
//!
//! Media bytes live under a fixed key layout (see [`keys`]):
//!
//! - primary objects: `images/{file_name}`
//! - video thumbnails: `thumbnails/{file_name}_thumbnail.jpg`
//!
//! Every backend implements [`ObjectStore`], so the gallery workflows never
//! depend on which service actually holds the bytes.

pub mod firebase;
pub mod keys;
pub mod local;

pub use firebase::FirebaseStorage;
pub use local::LocalStorage;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),
    #[error("Delete failed: {0}")]
    DeleteFailed(String),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
    #[error("IO error: {0}")]
    Io(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Called with `(bytes_transferred, total_bytes)` while an upload runs.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Blob store addressed by key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> StorageResult<()>;

    /// Resolve a URL the object can be fetched from.
    async fn download_url(&self, key: &str) -> StorageResult<String>;

    /// Remove an object. Missing objects fail with [`StorageError::NotFound`].
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Full keys of the objects directly under `prefix` (e.g. `images/`).
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

pub(crate) fn report_progress(progress: &Option<ProgressCallback>, sent: u64, total: u64) {
    if let Some(cb) = progress {
        cb(sent, total);
    }
}

pub(crate) fn directory_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{}/", prefix)
    }
}
