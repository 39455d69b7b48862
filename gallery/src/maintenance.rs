use crate::{Gallery, GalleryError, AUDIT_TARGET};
use chrono::Utc;
use records::{MediaRecord, MediaType, RecordDocument};
use std::collections::HashSet;
use std::path::Path;
use storage::{keys, StorageError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub deleted: Vec<String>,
    /// `(id, error)` for every item that could not be removed.
    pub failed: Vec<(String, String)>,
}

impl BulkDeleteReport {
    pub fn success_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn error_count(&self) -> usize {
        self.failed.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Objects found under `images/`.
    pub in_storage: usize,
    /// Documents read before reconciling.
    pub recorded: usize,
    pub added: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrunePolicy {
    Disabled,
    #[default]
    RemoveBrokenImages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    Removed,
    SkippedVideo,
    Disabled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

impl Gallery {
    /// Remove the media object, its thumbnail (if any) and the document.
    ///
    /// A failed thumbnail delete is logged and ignored.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self), fields(id = %record.id)))]
    pub async fn delete_record(&self, record: &MediaRecord) -> Result<(), GalleryError> {
        let media_key = keys::media_key(&record.file_name);
        self.objects
            .delete(&media_key)
            .await
            .map_err(|e| GalleryError::Storage(format!("Failed to delete {}: {}", media_key, e)))?;

        if record.media_type.is_video() && record.thumbnail_url.is_some() {
            let thumb_key = keys::thumbnail_key(&record.file_name);
            match self.objects.delete(&thumb_key).await {
                Ok(()) => {}
                Err(StorageError::NotFound(_)) => {
                    tracing::debug!(key = %thumb_key, "Thumbnail already gone")
                }
                Err(e) => tracing::warn!(key = %thumb_key, error = %e, "Failed to delete thumbnail"),
            }
        }

        self.records
            .delete(&record.id)
            .await
            .map_err(|e| GalleryError::Records(format!("Failed to delete record {}: {}", record.id, e)))?;

        tracing::info!(target: AUDIT_TARGET, id = %record.id, file = %record.file_name, "Deleted media item");
        Ok(())
    }

    /// Delete each record in order. One failure never stops the rest.
    pub async fn bulk_delete(&self, records: &[MediaRecord]) -> Result<BulkDeleteReport, GalleryError> {
        if records.is_empty() {
            return Err(GalleryError::NoItemsSelected);
        }
        let mut report = BulkDeleteReport::default();
        for record in records {
            match self.delete_record(record).await {
                Ok(()) => report.deleted.push(record.id.clone()),
                Err(e) => {
                    tracing::warn!(id = %record.id, error = %e, "Bulk delete item failed");
                    report.failed.push((record.id.clone(), e.to_string()));
                }
            }
        }
        tracing::info!(
            target: AUDIT_TARGET,
            deleted = report.success_count(),
            failed = report.error_count(),
            "Bulk delete finished"
        );
        Ok(report)
    }

    /// Create a document for every stored media object that has none.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    pub async fn reconcile(&self) -> Result<ReconcileReport, GalleryError> {
        let objects = self
            .objects
            .list(keys::MEDIA_PREFIX)
            .await
            .map_err(|e| GalleryError::Storage(format!("Failed to list media objects: {}", e)))?;
        let docs = self
            .records
            .read_all()
            .await
            .map_err(|e| GalleryError::Records(format!("Failed to read records: {}", e)))?;

        let mut known: HashSet<String> = docs.iter().filter_map(|d| d.file_name.clone()).collect();
        let mut report = ReconcileReport {
            in_storage: objects.len(),
            recorded: docs.len(),
            ..Default::default()
        };

        for key in &objects {
            let file_name = keys::file_name_of(key).to_string();
            if known.contains(&file_name) {
                continue;
            }
            let media_url = match self.objects.download_url(key).await {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Could not resolve URL during sync");
                    report.failed += 1;
                    continue;
                }
            };
            let doc = RecordDocument {
                id: file_name.clone(),
                media_url: Some(media_url),
                thumbnail_url: None,
                file_name: Some(file_name.clone()),
                media_type: Some(MediaType::classify(&file_name).as_str().to_string()),
                uploaded_at: Some(Utc::now()),
            };
            match self.records.put(doc).await {
                Ok(()) => {
                    tracing::info!(file = %file_name, "Recorded missing media item");
                    known.insert(file_name);
                    report.added += 1;
                }
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "Failed to record media item");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            in_storage = report.in_storage,
            recorded = report.recorded,
            added = report.added,
            failed = report.failed,
            "Sync finished"
        );
        Ok(report)
    }

    /// Drop the document of an image whose media could not be loaded.
    pub async fn prune_broken(&self, record: &MediaRecord) -> Result<PruneOutcome, GalleryError> {
        if self.prune_policy == PrunePolicy::Disabled {
            return Ok(PruneOutcome::Disabled);
        }
        if record.media_type.is_video() {
            return Ok(PruneOutcome::SkippedVideo);
        }
        self.records
            .delete(&record.id)
            .await
            .map_err(|e| GalleryError::Records(format!("Failed to prune {}: {}", record.id, e)))?;
        tracing::warn!(
            target: AUDIT_TARGET,
            id = %record.id,
            url = %record.media_url,
            "Removed record whose image failed to load"
        );
        Ok(PruneOutcome::Removed)
    }

    /// Write every stored document, valid or not, as pretty JSON.
    pub async fn export_records(&self, path: &Path) -> Result<usize, GalleryError> {
        let docs = self
            .records
            .read_all()
            .await
            .map_err(|e| GalleryError::Records(format!("Failed to read records: {}", e)))?;
        let json = serde_json::to_string_pretty(&docs)
            .map_err(|e| GalleryError::Serialization(e.to_string()))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| GalleryError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        tracing::info!(count = docs.len(), path = %path.display(), "Exported records");
        Ok(docs.len())
    }

    /// Read documents from a JSON export and write the valid ones in one batch.
    /// Records are keyed by file name, so a document whose id differs is skipped.
    pub async fn import_records(&self, path: &Path) -> Result<ImportReport, GalleryError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GalleryError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let docs: Vec<RecordDocument> =
            serde_json::from_str(&text).map_err(|e| GalleryError::Serialization(e.to_string()))?;

        let total = docs.len();
        let valid: Vec<RecordDocument> = docs
            .into_iter()
            .filter(|d| {
                !d.id.is_empty()
                    && d.file_name.as_deref() == Some(d.id.as_str())
                    && MediaRecord::from_document(d.clone()).is_some()
            })
            .collect();
        let report = ImportReport {
            imported: valid.len(),
            skipped: total - valid.len(),
        };

        if !valid.is_empty() {
            self.records
                .commit_batch(valid)
                .await
                .map_err(|e| GalleryError::Records(format!("Failed to import records: {}", e)))?;
        }
        tracing::info!(imported = report.imported, skipped = report.skipped, "Imported records");
        Ok(report)
    }
}
