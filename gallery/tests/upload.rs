use async_trait::async_trait;
use gallery::{Gallery, GalleryError, MediaType, SortMode, ThumbnailExtractor, UploadStatus};
use mocks::{MemoryObjectStore, MemoryRecordStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

struct FixedFrame;

#[async_trait]
impl ThumbnailExtractor for FixedFrame {
    async fn extract(&self, _video: &Path) -> Option<Vec<u8>> {
        Some(b"jpeg-frame".to_vec())
    }
}

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn setup() -> (Arc<MemoryObjectStore>, Arc<MemoryRecordStore>, Gallery) {
    let objects = Arc::new(MemoryObjectStore::new());
    let records = Arc::new(MemoryRecordStore::new());
    let gallery = Gallery::new(objects.clone(), records.clone());
    (objects, records, gallery)
}

#[tokio::test]
async fn empty_selection_has_no_side_effects() {
    let (objects, records, gallery) = setup();
    let err = gallery.upload_files(&[], None).await.unwrap_err();
    assert!(matches!(err, GalleryError::EmptySelection));
    assert!(objects.keys().is_empty());
    assert_eq!(records.write_count(), 0);
}

#[tokio::test]
async fn uploads_every_file_and_records_successes_in_one_batch() {
    let dir = TempDir::new().unwrap();
    let photo = write_file(&dir, "mum.jpg", b"photo-bytes");
    let clip = write_file(&dir, "party.MOV", b"video-bytes");
    let (objects, records, gallery) = setup();
    let gallery = gallery.with_thumbnailer(Arc::new(FixedFrame));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let report = gallery.upload_files(&[photo, clip], Some(tx)).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.succeeded(), 2);
    assert!(report.batch_error.is_none());
    assert_eq!(objects.get("images/mum.jpg").unwrap(), b"photo-bytes");
    assert_eq!(
        objects.get("thumbnails/party.MOV_thumbnail.jpg").unwrap(),
        b"jpeg-frame"
    );

    let video = records.get("party.MOV").unwrap();
    assert_eq!(video.media_type.as_deref(), Some("video"));
    assert_eq!(
        video.thumbnail_url.as_deref(),
        Some("mem://thumbnails/party.MOV_thumbnail.jpg")
    );
    let photo = records.get("mum.jpg").unwrap();
    assert_eq!(photo.media_url.as_deref(), Some("mem://images/mum.jpg"));
    assert_eq!(photo.thumbnail_url, None);
    assert_eq!(photo.uploaded_at, video.uploaded_at);
    assert!(photo.uploaded_at.is_some());

    let mut last = std::collections::HashMap::new();
    while let Ok(update) = rx.try_recv() {
        last.insert(update.file_name, update.percent);
    }
    assert_eq!(last.get("mum.jpg"), Some(&100));
    assert_eq!(last.get("party.MOV"), Some(&100));
}

#[tokio::test]
async fn one_failed_transfer_does_not_abort_siblings() {
    let dir = TempDir::new().unwrap();
    let good = write_file(&dir, "good.png", b"ok");
    let bad = write_file(&dir, "bad.png", b"nope");
    let missing = dir.path().join("missing.jpg");
    let (objects, records, gallery) = setup();
    objects.fail_upload("images/bad.png");

    let report = gallery.upload_files(&[good, bad, missing], None).await.unwrap();
    let statuses: Vec<UploadStatus> = report.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![UploadStatus::Success, UploadStatus::Error, UploadStatus::Error]
    );
    assert!(report.results[1].error.is_some());
    assert_eq!(records.len(), 1);
    assert_eq!(records.write_count(), 1);
}

#[tokio::test]
async fn failed_batch_is_reported_once() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.jpg", b"a");
    let b = write_file(&dir, "b.jpg", b"b");
    let (objects, records, gallery) = setup();
    records.set_fail_batches(true);

    let report = gallery.upload_files(&[a, b], None).await.unwrap();
    assert_eq!(report.succeeded(), 2);
    assert!(report.batch_error.is_some());
    assert!(objects.contains("images/a.jpg"));
    assert!(records.is_empty());
}

#[tokio::test]
async fn video_without_thumbnail_still_uploads() {
    let dir = TempDir::new().unwrap();
    let clip = write_file(&dir, "clip.webm", b"v");
    let (objects, records, gallery) = setup();

    let report = gallery.upload_files(&[clip], None).await.unwrap();
    assert_eq!(report.results[0].media_type, MediaType::Video);
    assert_eq!(report.results[0].thumbnail_url, None);
    assert!(!objects.contains("thumbnails/clip.webm_thumbnail.jpg"));

    let loaded = gallery.load(SortMode::Date).await.unwrap();
    assert_eq!(loaded.records.len(), 1);
    assert!(records.get("clip.webm").is_some());
}

#[tokio::test]
async fn reupload_overwrites_by_file_name() {
    let dir = TempDir::new().unwrap();
    let (objects, records, gallery) = setup();
    let first = write_file(&dir, "same.jpg", b"first");
    gallery.upload_files(&[first], None).await.unwrap();
    let second = write_file(&dir, "same.jpg", b"second");
    gallery.upload_files(&[second], None).await.unwrap();

    assert_eq!(objects.get("images/same.jpg").unwrap(), b"second");
    assert_eq!(records.len(), 1);
}
