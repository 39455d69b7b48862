//! Loads grid previews and viewer images, caching downloads on disk.

use iced::widget::image::Handle;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Semaphore;
use url::Url;

#[derive(Debug, Clone, Error)]
pub enum ImageLoaderError {
    /// Transport failure or a status worth retrying later (5xx, 429, ...).
    #[error("network error: {0}")]
    Request(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    /// The media is gone: 404/410, an empty body or a missing local file.
    #[error("media missing or empty: {0}")]
    Missing(String),
    #[error("semaphore closed")]
    SemaphoreClosed,
}

impl ImageLoaderError {
    /// Only a definitive miss justifies dropping the record that points here.
    pub fn is_missing(&self) -> bool {
        matches!(self, ImageLoaderError::Missing(_))
    }
}

#[derive(Debug, Clone)]
pub struct ImageLoader {
    cache_dir: PathBuf,
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl ImageLoader {
    pub fn new(cache_dir: PathBuf, workers: usize) -> Self {
        Self {
            cache_dir,
            client: reqwest::Client::new(),
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Location a downloaded `url` is cached at.
    pub fn cache_path_for(&self, url: &str) -> PathBuf {
        let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
        self.cache_dir.join("media").join(digest)
    }

    pub async fn load(&self, url: &str) -> Result<Handle, ImageLoaderError> {
        let parsed = Url::parse(url).map_err(|e| ImageLoaderError::InvalidUrl(format!("{}: {}", url, e)))?;
        match parsed.scheme() {
            "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|_| ImageLoaderError::InvalidUrl(url.to_string()))?;
                let meta = fs::metadata(&path)
                    .await
                    .map_err(|e| ImageLoaderError::Missing(format!("{}: {}", path.display(), e)))?;
                if !meta.is_file() || meta.len() == 0 {
                    return Err(ImageLoaderError::Missing(path.display().to_string()));
                }
                Ok(Handle::from_path(path))
            }
            "http" | "https" => self.download(url).await,
            other => Err(ImageLoaderError::UnsupportedScheme(other.to_string())),
        }
    }

    async fn download(&self, url: &str) -> Result<Handle, ImageLoaderError> {
        let start = Instant::now();
        let cache_path = self.cache_path_for(url);
        if cache_path.exists() {
            return Ok(Handle::from_path(&cache_path));
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ImageLoaderError::SemaphoreClosed)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageLoaderError::Request(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(ImageLoaderError::Missing(format!("{}: {}", url, status)));
        }
        if !status.is_success() {
            return Err(ImageLoaderError::Request(format!("{}: {}", url, status)));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageLoaderError::Request(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ImageLoaderError::Missing(url.to_string()));
        }

        let dir = cache_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.cache_dir.clone());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ImageLoaderError::Io(e.to_string()))?;
        let target = cache_path.clone();
        let data = bytes.clone();
        // Only complete files ever appear at the cache path.
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&data)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| ImageLoaderError::Io(e.to_string()))?
        .map_err(|e| ImageLoaderError::Io(e.to_string()))?;

        tracing::debug!(download_time_ms = %start.elapsed().as_millis(), size = bytes.len(), "Cached media");
        Ok(Handle::from_path(&cache_path))
    }
}
