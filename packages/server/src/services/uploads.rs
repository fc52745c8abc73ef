use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use common::storage::{BlobStore, StorageError, blob_path};
use tracing::{debug, warn};

use crate::utils::filename::generate_filename;

/// A file field recognized on an entity.
pub trait FileField: Copy + Ord {
    /// Request field and column name, e.g. `thumb_file`.
    fn name(self) -> &'static str;
}

/// Bytes received for one file field, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadPayload {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Value of a file field in a write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileValue {
    /// A new upload waiting for a generated name.
    Upload(UploadPayload),
    /// A filename already assigned.
    Stored(String),
}

impl FileValue {
    pub fn filename(&self) -> Option<&str> {
        match self {
            FileValue::Stored(name) => Some(name),
            FileValue::Upload(_) => None,
        }
    }
}

/// An upload paired with the filename generated for it.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub field: &'static str,
    pub filename: String,
    pub payload: UploadPayload,
}

/// Replace every upload in `files` with a generated filename.
///
/// Returns the uploads in field order. Values that are already filenames are
/// left untouched, so a set without uploads comes back unchanged.
pub fn extract_files<F: FileField>(files: &mut BTreeMap<F, FileValue>) -> Vec<StagedFile> {
    let mut staged = Vec::new();
    for (field, value) in files.iter_mut() {
        if let FileValue::Upload(payload) = value {
            let filename = generate_filename(&payload.original_name);
            let previous = std::mem::replace(value, FileValue::Stored(filename.clone()));
            if let FileValue::Upload(payload) = previous {
                staged.push(StagedFile {
                    field: field.name(),
                    filename,
                    payload,
                });
            }
        }
    }
    staged
}

/// Filenames present in `before` that no longer appear in `after`.
pub fn superseded<'a>(
    before: &'a [Option<String>],
    after: &[Option<String>],
) -> Vec<&'a str> {
    before
        .iter()
        .flatten()
        .filter(|name| !after.iter().flatten().any(|current| current == *name))
        .map(String::as_str)
        .collect()
}

/// The blob directory owned by one entity.
#[derive(Clone)]
pub struct UploadDir {
    store: Arc<dyn BlobStore>,
    dir: String,
}

impl UploadDir {
    pub fn new(store: Arc<dyn BlobStore>, dir: impl Into<String>) -> Self {
        Self {
            store,
            dir: dir.into(),
        }
    }

    pub fn path(&self, filename: &str) -> String {
        blob_path(&self.dir, filename)
    }

    pub async fn upload_file(&self, file: &StagedFile) -> Result<(), StorageError> {
        self.store
            .put(&self.path(&file.filename), &file.payload.bytes)
            .await?;
        debug!(
            dir = %self.dir,
            field = file.field,
            filename = %file.filename,
            size = file.payload.size(),
            "Uploaded file"
        );
        Ok(())
    }

    /// Upload every staged file, stopping at the first failure.
    pub async fn upload_files(&self, files: &[StagedFile]) -> Result<(), StorageError> {
        for file in files {
            self.upload_file(file).await?;
        }
        Ok(())
    }

    /// Best-effort delete; failures are logged and skipped.
    pub async fn delete_files<S: AsRef<str> + Sync>(&self, filenames: &[S]) -> usize {
        let mut deleted = 0;
        for filename in filenames {
            let path = self.path(filename.as_ref());
            match self.store.delete(&path).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) => warn!(path = %path, error = %e, "Failed to delete file"),
            }
        }
        deleted
    }

    /// Delete files referenced in `before` but not in `after`.
    ///
    /// Only call this once the write that produced `after` has committed.
    pub async fn delete_old_files(&self, before: &[Option<String>], after: &[Option<String>]) {
        let stale = superseded(before, after);
        if stale.is_empty() {
            return;
        }
        let deleted = self.delete_files(&stale).await;
        debug!(dir = %self.dir, stale = stale.len(), deleted, "Deleted superseded files");
    }
}
