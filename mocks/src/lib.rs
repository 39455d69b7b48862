//! In-memory backends with fault injection, for exercising the gallery
//! workflows without a network or a database.

use async_trait::async_trait;
use records::{RecordDocument, RecordError, RecordResult, RecordStore};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use storage::{ObjectStore, ProgressCallback, StorageError, StorageResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Object store backed by a map. URLs look like `mem://images/a.jpg`.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    failing_uploads: Mutex<HashSet<String>>,
    failing_deletes: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, data: Vec<u8>) {
        lock(&self.objects).insert(key.to_string(), data);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.objects).get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.objects).contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        lock(&self.objects).keys().cloned().collect()
    }

    /// Make every upload to `key` fail.
    pub fn fail_upload(&self, key: &str) {
        lock(&self.failing_uploads).insert(key.to_string());
    }

    /// Make every delete of `key` fail with something other than not-found.
    pub fn fail_delete(&self, key: &str) {
        lock(&self.failing_deletes).insert(key.to_string());
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn url_for(key: &str) -> String {
        format!("mem://{}", key)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
        progress: Option<ProgressCallback>,
    ) -> StorageResult<()> {
        if lock(&self.failing_uploads).contains(key) {
            return Err(StorageError::UploadFailed(format!("injected failure for {}", key)));
        }
        let total = data.len() as u64;
        if let Some(cb) = &progress {
            cb(0, total);
            cb(total / 2, total);
            cb(total, total);
        }
        self.insert(key, data);
        Ok(())
    }

    async fn download_url(&self, key: &str) -> StorageResult<String> {
        if self.contains(key) {
            Ok(Self::url_for(key))
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if lock(&self.failing_deletes).contains(key) {
            return Err(StorageError::DeleteFailed(format!("injected failure for {}", key)));
        }
        match lock(&self.objects).remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("injected listing failure".into()));
        }
        Ok(lock(&self.objects)
            .keys()
            .filter(|k| {
                k.strip_prefix(prefix)
                    .map(|rest| !rest.is_empty() && !rest.contains('/'))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

/// Record store backed by a map, counting every document written.
#[derive(Default)]
pub struct MemoryRecordStore {
    docs: Mutex<BTreeMap<String, RecordDocument>>,
    failing_deletes: Mutex<HashSet<String>>,
    fail_batches: AtomicBool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without counting it as a write.
    pub fn insert(&self, doc: RecordDocument) {
        lock(&self.docs).insert(doc.id.clone(), doc);
    }

    pub fn get(&self, id: &str) -> Option<RecordDocument> {
        lock(&self.docs).get(id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.docs).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Documents written through `put` or `commit_batch` so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_batches(&self, fail: bool) {
        self.fail_batches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, id: &str) {
        lock(&self.failing_deletes).insert(id.to_string());
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn read_all(&self) -> RecordResult<Vec<RecordDocument>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RecordError::BackendError("injected read failure".into()));
        }
        Ok(lock(&self.docs).values().cloned().collect())
    }

    async fn put(&self, doc: RecordDocument) -> RecordResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(doc);
        Ok(())
    }

    async fn delete(&self, id: &str) -> RecordResult<()> {
        if lock(&self.failing_deletes).contains(id) {
            return Err(RecordError::BackendError(format!("injected delete failure for {}", id)));
        }
        lock(&self.docs).remove(id);
        Ok(())
    }

    async fn commit_batch(&self, docs: Vec<RecordDocument>) -> RecordResult<()> {
        if self.fail_batches.load(Ordering::SeqCst) {
            tracing::debug!(count = docs.len(), "Rejecting batch");
            return Err(RecordError::BackendError("injected batch failure".into()));
        }
        self.writes.fetch_add(docs.len(), Ordering::SeqCst);
        let mut map = lock(&self.docs);
        for doc in docs {
            map.insert(doc.id.clone(), doc);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_is_not_recursive() {
        let store = MemoryObjectStore::new();
        store.insert("images/a.jpg", vec![1]);
        store.insert("images/nested/b.jpg", vec![2]);
        store.insert("thumbnails/a.mp4_thumbnail.jpg", vec![3]);
        assert_eq!(store.list("images/").await.unwrap(), vec!["images/a.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_batch_writes_nothing() {
        let store = MemoryRecordStore::new();
        store.set_fail_batches(true);
        let doc = RecordDocument {
            id: "a.jpg".into(),
            ..Default::default()
        };
        assert!(store.commit_batch(vec![doc]).await.is_err());
        assert!(store.is_empty());
        assert_eq!(store.write_count(), 0);
    }
}
