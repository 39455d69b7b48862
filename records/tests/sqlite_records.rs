use chrono::{TimeZone, Utc};
use records::{RecordDocument, RecordStore, SqliteRecords};
use rusqlite::Connection;
use tempfile::NamedTempFile;

fn doc(id: &str) -> RecordDocument {
    RecordDocument {
        id: id.to_string(),
        media_url: Some(format!("file:///media/{}", id)),
        file_name: Some(id.to_string()),
        media_type: Some("image".into()),
        uploaded_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single(),
        ..Default::default()
    }
}

#[test]
fn test_new_applies_migrations() {
    let file = NamedTempFile::new().unwrap();
    let _ = SqliteRecords::new(file.path()).unwrap();
    let conn = Connection::open(file.path()).unwrap();
    let version: i64 = conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, 2);
}

#[tokio::test]
async fn put_replaces_whole_document() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteRecords::new(file.path()).unwrap();
    let mut first = doc("clip.mp4");
    first.thumbnail_url = Some("file:///thumb.jpg".into());
    store.put(first).await.unwrap();

    let second = RecordDocument {
        id: "clip.mp4".into(),
        media_url: Some("file:///other.mp4".into()),
        ..Default::default()
    };
    store.put(second.clone()).await.unwrap();

    let all = store.read_all().await.unwrap();
    assert_eq!(all, vec![second]);
}

#[tokio::test]
async fn batch_and_delete() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteRecords::new(file.path()).unwrap();
    store
        .commit_batch(vec![doc("a.jpg"), doc("b.jpg"), doc("c.jpg")])
        .await
        .unwrap();
    assert_eq!(store.count().unwrap(), 3);

    store.delete("b.jpg").await.unwrap();
    store.delete("never-existed.jpg").await.unwrap();

    let ids: Vec<String> = store.read_all().await.unwrap().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec!["a.jpg".to_string(), "c.jpg".to_string()]);
}

#[test]
fn unreadable_timestamp_is_treated_as_missing() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteRecords::new(file.path()).unwrap();
    store.put_document(&doc("old.jpg")).unwrap();
    {
        let conn = Connection::open(file.path()).unwrap();
        conn.execute(
            "UPDATE media_records SET uploaded_at = 'yesterday' WHERE id = 'old.jpg'",
            [],
        )
        .unwrap();
    }
    let all = store.all_documents().unwrap();
    assert_eq!(all[0].uploaded_at, None);
    assert_eq!(all[0].file_name.as_deref(), Some("old.jpg"));
}
