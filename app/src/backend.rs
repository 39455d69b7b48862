use crate::config::{AppConfig, BackendKind};
use gallery::{FfmpegThumbnailer, Gallery, PrunePolicy};
use records::{FirestoreRecords, RecordStore, SqliteRecords};
use std::error::Error;
use std::sync::Arc;
use storage::{FirebaseStorage, LocalStorage, ObjectStore};

/// Build the gallery service for the configured backend.
pub async fn build_gallery(cfg: &AppConfig) -> Result<Gallery, Box<dyn Error>> {
    let (objects, records): (Arc<dyn ObjectStore>, Arc<dyn RecordStore>) = match cfg.backend {
        BackendKind::Local => {
            std::fs::create_dir_all(&cfg.data_dir)?;
            let objects = LocalStorage::new(cfg.data_dir.join("media")).await?;
            let records = SqliteRecords::new(&cfg.data_dir.join("records.sqlite"))?;
            tracing::info!(data_dir = %cfg.data_dir.display(), "Using local backend");
            (Arc::new(objects), Arc::new(records))
        }
        BackendKind::Firebase => {
            let project = cfg
                .firebase_project_id
                .clone()
                .ok_or("firebase_project_id must be set for the firebase backend")?;
            let bucket = cfg
                .firebase_bucket
                .clone()
                .unwrap_or_else(|| format!("{}.appspot.com", project));
            let token = auth::get_access_token()?;
            if token.is_none() {
                tracing::warn!("No access token configured; requests will be anonymous");
            }

            let mut objects = match &cfg.storage_base_url {
                Some(base) => FirebaseStorage::with_base_url(bucket, base.clone()),
                None => FirebaseStorage::new(bucket),
            };
            objects.set_access_token(token.clone());

            let mut records = match &cfg.firestore_base_url {
                Some(base) => FirestoreRecords::with_base_url(project.clone(), cfg.collection.clone(), base.clone()),
                None => FirestoreRecords::new(project.clone(), cfg.collection.clone()),
            };
            records.set_access_token(token);
            tracing::info!(project = %project, collection = %cfg.collection, "Using firebase backend");
            (Arc::new(objects), Arc::new(records))
        }
    };

    let policy = if cfg.prune_broken_images {
        PrunePolicy::RemoveBrokenImages
    } else {
        PrunePolicy::Disabled
    };
    let mut gallery = Gallery::new(objects, records).with_prune_policy(policy);

    if cfg.thumbnails {
        match FfmpegThumbnailer::detect() {
            Some(thumbnailer) => gallery = gallery.with_thumbnailer(Arc::new(thumbnailer)),
            None => tracing::info!("ffmpeg not found; videos will be uploaded without thumbnails"),
        }
    }
    Ok(gallery)
}
