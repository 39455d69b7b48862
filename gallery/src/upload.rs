use crate::{Gallery, GalleryError};
use chrono::Utc;
use futures::future::join_all;
use records::{MediaType, RecordDocument};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::{keys, ProgressCallback};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub file_name: String,
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub file_name: String,
    pub status: UploadStatus,
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub media_type: MediaType,
    pub error: Option<String>,
}

impl UploadResult {
    fn failed(file_name: String, media_type: MediaType, error: String) -> Self {
        UploadResult {
            file_name,
            status: UploadStatus::Error,
            media_url: None,
            thumbnail_url: None,
            media_type,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UploadStatus::Success
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    /// One entry per selected file, in selection order.
    pub results: Vec<UploadResult>,
    /// Set when the metadata batch for the successful files failed.
    pub batch_error: Option<String>,
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Rounded percentage; an empty transfer counts as complete.
pub(crate) fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (sent as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

fn progress_callback(file_name: &str, tx: Option<UnboundedSender<UploadProgress>>) -> Option<ProgressCallback> {
    let tx = tx?;
    let file_name = file_name.to_string();
    Some(Arc::new(move |sent, total| {
        let _ = tx.send(UploadProgress {
            file_name: file_name.clone(),
            percent: percent(sent, total),
        });
    }))
}

impl Gallery {
    /// Upload every file concurrently, then record the successful ones in a
    /// single batch stamped with the current time.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, progress)))]
    pub async fn upload_files(
        &self,
        paths: &[PathBuf],
        progress: Option<UnboundedSender<UploadProgress>>,
    ) -> Result<UploadReport, GalleryError> {
        if paths.is_empty() {
            return Err(GalleryError::EmptySelection);
        }
        tracing::info!(count = paths.len(), "Starting upload");

        let results = join_all(paths.iter().map(|path| self.upload_one(path, progress.clone()))).await;

        let uploaded_at = Utc::now();
        let docs: Vec<RecordDocument> = results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| RecordDocument {
                id: r.file_name.clone(),
                media_url: r.media_url.clone(),
                thumbnail_url: r.thumbnail_url.clone(),
                file_name: Some(r.file_name.clone()),
                media_type: Some(r.media_type.as_str().to_string()),
                uploaded_at: Some(uploaded_at),
            })
            .collect();

        let mut batch_error = None;
        if !docs.is_empty() {
            let count = docs.len();
            match self.records.commit_batch(docs).await {
                Ok(()) => tracing::info!(count, "Upload metadata saved"),
                Err(e) => {
                    tracing::error!(count, error = %e, "Failed to save upload metadata");
                    batch_error = Some(e.to_string());
                }
            }
        }

        let report = UploadReport { results, batch_error };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Upload finished"
        );
        Ok(report)
    }

    async fn upload_one(&self, path: &Path, progress: Option<UnboundedSender<UploadProgress>>) -> UploadResult {
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                let shown = path.display().to_string();
                return UploadResult::failed(shown, MediaType::Image, "File name is not valid UTF-8".into());
            }
        };
        let media_type = MediaType::classify(&file_name);

        match self.transfer(path, &file_name, media_type, progress).await {
            Ok((media_url, thumbnail_url)) => UploadResult {
                file_name,
                status: UploadStatus::Success,
                media_url: Some(media_url),
                thumbnail_url,
                media_type,
                error: None,
            },
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "Upload failed");
                UploadResult::failed(file_name, media_type, e.to_string())
            }
        }
    }

    async fn transfer(
        &self,
        path: &Path,
        file_name: &str,
        media_type: MediaType,
        progress: Option<UnboundedSender<UploadProgress>>,
    ) -> Result<(String, Option<String>), GalleryError> {
        keys::validate_file_name(file_name).map_err(|e| GalleryError::Storage(e.to_string()))?;
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| GalleryError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let content_type = mime_guess::from_path(path).first_or_octet_stream();

        let key = keys::media_key(file_name);
        self.objects
            .upload(&key, data, content_type.essence_str(), progress_callback(file_name, progress))
            .await
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let media_url = self
            .objects
            .download_url(&key)
            .await
            .map_err(|e| GalleryError::Storage(e.to_string()))?;

        let thumbnail_url = if media_type.is_video() {
            self.upload_thumbnail(path, file_name).await
        } else {
            None
        };
        tracing::debug!(file = %file_name, %media_type, "Uploaded");
        Ok((media_url, thumbnail_url))
    }

    async fn upload_thumbnail(&self, path: &Path, file_name: &str) -> Option<String> {
        let frame = self.thumbnailer.extract(path).await?;
        let key = keys::thumbnail_key(file_name);
        let uploaded = self.objects.upload(&key, frame, "image/jpeg", None).await;
        let url = match uploaded {
            Ok(()) => self.objects.download_url(&key).await,
            Err(e) => Err(e),
        };
        match url {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "Thumbnail upload failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::percent;

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(0, 10), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(10, 10), 100);
    }
}
