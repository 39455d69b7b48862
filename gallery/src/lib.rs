//! Memorial gallery workflows.
//!
//! [`Gallery`] ties an [`ObjectStore`] holding media bytes to a
//! [`RecordStore`] holding one metadata document per file. Every workflow is a
//! short sequence of calls into those two backends:
//!
//! - [`Gallery::upload_files`] transfers files concurrently and writes one batch
//! - [`Gallery::load`] reads, validates and orders the records
//! - [`Gallery::delete_record`] / [`Gallery::bulk_delete`] remove media and metadata
//! - [`Gallery::reconcile`] records storage objects that have no document
//!
//! [`state::GalleryState`] is the matching view state machine.

mod maintenance;
pub mod sort;
pub mod state;
pub mod thumbnail;
mod upload;

pub use maintenance::{BulkDeleteReport, ImportReport, PruneOutcome, PrunePolicy, ReconcileReport};
pub use sort::SortMode;
pub use thumbnail::{FfmpegThumbnailer, NoThumbnails, ThumbnailExtractor};
pub use upload::{UploadProgress, UploadReport, UploadResult, UploadStatus};

pub use records::{MediaRecord, MediaType, RecordDocument};

use records::RecordStore;
use std::sync::Arc;
use storage::ObjectStore;
use thiserror::Error;

/// Log target for destructive operations.
pub const AUDIT_TARGET: &str = "memorial::audit";

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Please select at least one file")]
    EmptySelection,
    #[error("No items selected")]
    NoItemsSelected,
    #[error("Storage Error: {0}")]
    Storage(String),
    #[error("Record Error: {0}")]
    Records(String),
    #[error("IO Error: {0}")]
    Io(String),
    #[error("Serialization Error: {0}")]
    Serialization(String),
}

/// Result of [`Gallery::load`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedGallery {
    pub records: Vec<MediaRecord>,
    /// Stored documents dropped because they lack a media URL or file name.
    pub skipped: usize,
}

#[derive(Clone)]
pub struct Gallery {
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn RecordStore>,
    thumbnailer: Arc<dyn ThumbnailExtractor>,
    prune_policy: PrunePolicy,
}

impl Gallery {
    pub fn new(objects: Arc<dyn ObjectStore>, records: Arc<dyn RecordStore>) -> Self {
        Gallery {
            objects,
            records,
            thumbnailer: Arc::new(NoThumbnails),
            prune_policy: PrunePolicy::default(),
        }
    }

    pub fn with_thumbnailer(mut self, thumbnailer: Arc<dyn ThumbnailExtractor>) -> Self {
        self.thumbnailer = thumbnailer;
        self
    }

    pub fn with_prune_policy(mut self, policy: PrunePolicy) -> Self {
        self.prune_policy = policy;
        self
    }

    pub fn prune_policy(&self) -> PrunePolicy {
        self.prune_policy
    }

    pub fn objects(&self) -> &Arc<dyn ObjectStore> {
        &self.objects
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    /// Fetch every document, drop invalid ones and order the rest.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    pub async fn load(&self, mode: SortMode) -> Result<LoadedGallery, GalleryError> {
        let docs = self
            .records
            .read_all()
            .await
            .map_err(|e| GalleryError::Records(format!("Failed to read records: {}", e)))?;

        let total = docs.len();
        let mut records = Vec::with_capacity(total);
        for doc in docs {
            let id = doc.id.clone();
            match MediaRecord::from_document(doc) {
                Some(record) => records.push(record),
                None => tracing::debug!(id = %id, "Skipping document without media URL or file name"),
            }
        }
        let skipped = total - records.len();
        if skipped > 0 {
            tracing::warn!(skipped, "Skipped invalid documents while loading gallery");
        }

        sort::apply(&mut records, mode, &mut rand::rng());
        tracing::info!(count = records.len(), sort = %mode, "Gallery loaded");
        Ok(LoadedGallery { records, skipped })
    }
}
