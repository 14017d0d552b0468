use crate::error::StoreError;
use crate::models::DocumentRecord;
use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex;

/// Durable home for uploaded documents. Content is immutable after
/// `create`; a missing id is `StoreError::NotFound`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, filename: &str, content: &str) -> Result<i64, StoreError>;

    async fn get(&self, document_id: i64) -> Result<DocumentRecord, StoreError>;
}

fn digest_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn build_record(id: i64, filename: &str, content: &str) -> DocumentRecord {
    DocumentRecord {
        id,
        filename: filename.to_string(),
        content: content.to_string(),
        checksum: digest_content(content),
        uploaded_at: Utc::now(),
    }
}

/// In-process store, mostly for tests.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<i64, DocumentRecord>>,
    next_id: AtomicI64,
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, filename: &str, content: &str) -> Result<i64, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = build_record(id, filename, content);
        self.documents.lock().await.insert(id, record);
        Ok(id)
    }

    async fn get(&self, document_id: i64) -> Result<DocumentRecord, StoreError> {
        self.documents
            .lock()
            .await
            .get(&document_id)
            .cloned()
            .ok_or(StoreError::NotFound(document_id))
    }
}

/// Single-file JSON store. Good enough as CLI glue; the relational store a
/// deployment would use sits behind the same trait.
pub struct JsonDocumentStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<i64, DocumentRecord>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(StoreError::Io(error)),
        }
    }

    async fn write_all(&self, documents: &BTreeMap<i64, DocumentRecord>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(documents)?).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn create(&self, filename: &str, content: &str) -> Result<i64, StoreError> {
        let _guard = self.lock.lock().await;
        let mut documents = self.read_all().await?;
        let id = documents.keys().next_back().copied().unwrap_or(0) + 1;
        documents.insert(id, build_record(id, filename, content));
        self.write_all(&documents).await?;
        Ok(id)
    }

    async fn get(&self, document_id: i64) -> Result<DocumentRecord, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_all()
            .await?
            .remove(&document_id)
            .ok_or(StoreError::NotFound(document_id))
    }
}
