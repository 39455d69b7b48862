use storage::keys::{media_key, thumbnail_key};
use storage::{LocalStorage, ObjectStore, StorageError};
use tempfile::tempdir;

#[tokio::test]
async fn upload_then_resolve_url() {
    let dir = tempdir().unwrap();
    let store = LocalStorage::new(dir.path()).await.unwrap();
    let key = media_key("mum.jpg");
    store
        .upload(&key, b"bytes".to_vec(), "image/jpeg", None)
        .await
        .unwrap();

    let url = store.download_url(&key).await.unwrap();
    assert!(url.starts_with("file://"));
    assert!(url.ends_with("images/mum.jpg"));
    let on_disk = std::fs::read(store.base_path().join("images/mum.jpg")).unwrap();
    assert_eq!(on_disk, b"bytes");
}

#[tokio::test]
async fn delete_reports_missing_objects() {
    let dir = tempdir().unwrap();
    let store = LocalStorage::new(dir.path()).await.unwrap();
    let err = store.delete(&thumbnail_key("clip.mp4")).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn list_only_returns_direct_children() {
    let dir = tempdir().unwrap();
    let store = LocalStorage::new(dir.path()).await.unwrap();
    store.upload(&media_key("b.jpg"), vec![1], "image/jpeg", None).await.unwrap();
    store.upload(&media_key("a.mp4"), vec![2], "video/mp4", None).await.unwrap();
    store.upload(&thumbnail_key("a.mp4"), vec![3], "image/jpeg", None).await.unwrap();

    let keys = store.list("images/").await.unwrap();
    assert_eq!(keys, vec!["images/a.mp4".to_string(), "images/b.jpg".to_string()]);
    assert!(store.list("missing/").await.unwrap().is_empty());
}

#[tokio::test]
async fn rejects_keys_outside_root() {
    let dir = tempdir().unwrap();
    let store = LocalStorage::new(dir.path()).await.unwrap();
    let err = store
        .upload("images/../../escape", vec![0], "image/jpeg", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidKey(_)));
}
