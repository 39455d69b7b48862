//! SQLite record store used by the offline backend.

use crate::{RecordDocument, RecordError, RecordResult, RecordStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use rusqlite_migration::{Migrations, M};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct SqliteRecords {
    conn: Arc<Mutex<Connection>>,
}

fn apply_migrations(conn: &mut Connection) -> Result<(), RecordError> {
    let migrations = Migrations::new(vec![
        M::up(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);\
             INSERT INTO schema_version (version) VALUES (1);\
             CREATE TABLE IF NOT EXISTS media_records (\
                 id TEXT PRIMARY KEY,\
                 image_url TEXT,\
                 thumbnail_url TEXT,\
                 file_name TEXT,\
                 file_type TEXT,\
                 uploaded_at TEXT\
             );",
        ),
        M::up(
            "CREATE INDEX IF NOT EXISTS idx_media_records_uploaded_at ON media_records (uploaded_at);\
             UPDATE schema_version SET version = 2;",
        ),
    ]);
    migrations
        .to_latest(conn)
        .map_err(|e| RecordError::DatabaseError(format!("Failed to apply migrations: {}", e)))?;
    Ok(())
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<RecordDocument> {
    let uploaded_at: Option<String> = row.get(5)?;
    Ok(RecordDocument {
        id: row.get(0)?,
        media_url: row.get(1)?,
        thumbnail_url: row.get(2)?,
        file_name: row.get(3)?,
        media_type: row.get(4)?,
        uploaded_at: uploaded_at.and_then(|s| parse_timestamp(&s)),
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(value, error = %e, "Ignoring unreadable upload timestamp");
            None
        }
    }
}

fn upsert(conn: &Connection, doc: &RecordDocument) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT OR REPLACE INTO media_records (
            id, image_url, thumbnail_url, file_name, file_type, uploaded_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            doc.id,
            doc.media_url,
            doc.thumbnail_url,
            doc.file_name,
            doc.media_type,
            doc.uploaded_at.map(|ts| ts.to_rfc3339()),
        ],
    )
}

impl SqliteRecords {
    pub fn new(db_path: &Path) -> Result<Self, RecordError> {
        let mut conn = Connection::open(db_path)
            .map_err(|e| RecordError::DatabaseError(format!("Failed to open database: {}", e)))?;
        apply_migrations(&mut conn)?;
        Ok(SqliteRecords {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, RecordError> {
        self.conn
            .lock()
            .map_err(|_| RecordError::Other("Poisoned lock".into()))
    }

    pub fn all_documents(&self) -> Result<Vec<RecordDocument>, RecordError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, image_url, thumbnail_url, file_name, file_type, uploaded_at
                 FROM media_records ORDER BY id",
            )
            .map_err(|e| RecordError::DatabaseError(format!("Failed to prepare statement: {}", e)))?;
        let rows = stmt
            .query_map([], row_to_document)
            .map_err(|e| RecordError::DatabaseError(format!("Failed to query records: {}", e)))?;

        let mut docs = Vec::new();
        for row in rows {
            docs.push(row.map_err(|e| RecordError::DeserializationError(e.to_string()))?);
        }
        Ok(docs)
    }

    pub fn put_document(&self, doc: &RecordDocument) -> Result<(), RecordError> {
        let conn = self.lock_conn()?;
        upsert(&conn, doc)
            .map_err(|e| RecordError::DatabaseError(format!("Failed to write record {}: {}", doc.id, e)))?;
        Ok(())
    }

    pub fn delete_document(&self, id: &str) -> Result<(), RecordError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM media_records WHERE id = ?1", params![id])
            .map_err(|e| RecordError::DatabaseError(format!("Failed to delete record {}: {}", id, e)))?;
        Ok(())
    }

    pub fn commit_documents(&self, docs: &[RecordDocument]) -> Result<(), RecordError> {
        let mut conn = self.lock_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RecordError::DatabaseError(format!("Failed to begin batch: {}", e)))?;
        for doc in docs {
            upsert(&tx, doc).map_err(|e| {
                RecordError::DatabaseError(format!("Failed to write record {}: {}", doc.id, e))
            })?;
        }
        tx.commit()
            .map_err(|e| RecordError::DatabaseError(format!("Failed to commit batch: {}", e)))?;
        tracing::debug!(count = docs.len(), "Committed record batch");
        Ok(())
    }

    pub fn count(&self) -> Result<usize, RecordError> {
        let conn = self.lock_conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM media_records", [], |row| row.get(0))
            .map_err(|e| RecordError::DatabaseError(e.to_string()))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl RecordStore for SqliteRecords {
    async fn read_all(&self) -> RecordResult<Vec<RecordDocument>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.all_documents())
            .await
            .map_err(|e| RecordError::Other(e.to_string()))?
    }

    async fn put(&self, doc: RecordDocument) -> RecordResult<()> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.put_document(&doc))
            .await
            .map_err(|e| RecordError::Other(e.to_string()))?
    }

    async fn delete(&self, id: &str) -> RecordResult<()> {
        let this = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || this.delete_document(&id))
            .await
            .map_err(|e| RecordError::Other(e.to_string()))?
    }

    async fn commit_batch(&self, docs: Vec<RecordDocument>) -> RecordResult<()> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.commit_documents(&docs))
            .await
            .map_err(|e| RecordError::Other(e.to_string()))?
    }
}
