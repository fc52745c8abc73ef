use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::io::AsyncReadExt;

use super::error::StorageError;
use super::path::validate_blob_path;
use super::traits::{BlobStore, BoxReader};

/// In-memory blob store.
///
/// Cloning shares the underlying map, so a test can hand one clone to the
/// application and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_stream(&self, path: &str, mut reader: BoxReader) -> Result<u64, StorageError> {
        let path = validate_blob_path(path)?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        let written = buf.len() as u64;
        self.blobs.insert(path.to_string(), buf);
        Ok(written)
    }

    async fn get_stream(&self, path: &str) -> Result<BoxReader, StorageError> {
        let path = validate_blob_path(path)?;
        let data = self
            .blobs
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        Ok(Box::new(Cursor::new(data)))
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let path = validate_blob_path(path)?;
        Ok(self.blobs.contains_key(path))
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let path = validate_blob_path(path)?;
        Ok(self.blobs.remove(path).is_some())
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let path = validate_blob_path(path)?;
        self.blobs
            .get(path)
            .map(|entry| entry.value().len() as u64)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn all_files(&self) -> Result<Vec<String>, StorageError> {
        let mut files: Vec<String> = self.blobs.iter().map(|e| e.key().clone()).collect();
        files.sort();
        Ok(files)
    }
}
