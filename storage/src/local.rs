//! Local filesystem backend with `file://` retrieval URLs.

use crate::{directory_prefix, keys, report_progress, ObjectStore, ProgressCallback, StorageError, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use url::Url;

const WRITE_CHUNK: usize = 256 * 1024;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Open (and create if needed) a storage root.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::Io(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;
        let base_path = base_path.canonicalize().map_err(|e| {
            StorageError::Io(format!("Failed to canonicalize {}: {}", base_path.display(), e))
        })?;
        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        keys::validate_key(key)?;
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::UploadFailed(format!("{}: {}", parent.display(), e)))?;
        }

        let total = data.len() as u64;
        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to create {}: {}", path.display(), e)))?;
        report_progress(&progress, 0, total);

        let mut written = 0u64;
        for chunk in data.chunks(WRITE_CHUNK) {
            file.write_all(chunk)
                .await
                .map_err(|e| StorageError::UploadFailed(format!("Failed to write {}: {}", path.display(), e)))?;
            written += chunk.len() as u64;
            report_progress(&progress, written, total);
        }
        file.sync_all()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to sync {}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), size_bytes = total, "Local storage upload successful");
        Ok(())
    }

    async fn download_url(&self, key: &str) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Url::from_file_path(&path)
            .map(|u| u.to_string())
            .map_err(|_| StorageError::BackendError(format!("Cannot build URL for {}", path.display())))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(StorageError::DeleteFailed(format!("{}: {}", path.display(), e))),
        }
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let prefix = directory_prefix(prefix);
        let dir = self.key_to_path(prefix.trim_end_matches('/')).unwrap_or_else(|_| self.base_path.clone());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(format!("{}: {}", dir.display(), e))),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                keys.push(format!("{}{}", prefix, name));
            }
        }
        keys.sort();
        Ok(keys)
    }
}
