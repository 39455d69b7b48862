//! Metadata records for memorial media and the stores that persist them.

pub mod firestore;
pub mod model;
pub mod sqlite;

pub use firestore::FirestoreRecords;
pub use model::{MediaRecord, MediaType, RecordDocument};
pub use sqlite::SqliteRecords;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Database Error: {0}")]
    DatabaseError(String),
    #[error("Serialization Error: {0}")]
    SerializationError(String),
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
    #[error("Record backend error: {0}")]
    BackendError(String),
    #[error("Other Error: {0}")]
    Other(String),
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Document store holding one document per uploaded file, keyed by file name.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every stored document, valid or not.
    async fn read_all(&self) -> RecordResult<Vec<RecordDocument>>;

    /// Create or wholesale replace the document `doc.id`.
    async fn put(&self, doc: RecordDocument) -> RecordResult<()>;

    /// Remove a document. Removing a missing id succeeds.
    async fn delete(&self, id: &str) -> RecordResult<()>;

    /// Write all documents atomically: either every one lands or none does.
    async fn commit_batch(&self, docs: Vec<RecordDocument>) -> RecordResult<()>;
}
