use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, error, warn};

use crate::error::AppError;
use crate::services::uploads::{StagedFile, UploadDir};

/// Progress of one write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Started,
    FilesExtracted,
    RecordPersisted,
    RelationsSynced,
    FilesUploaded,
    Committed,
    RolledBack,
}

impl WriteStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, WriteStage::Committed | WriteStage::RolledBack)
    }
}

/// Staged uploads together with the directory they belong in.
pub struct StagedUploads {
    pub dir: UploadDir,
    pub files: Vec<StagedFile>,
}

impl StagedUploads {
    fn filenames(&self) -> Vec<String> {
        self.files.iter().map(|f| f.filename.clone()).collect()
    }
}

/// Transactional scaffolding shared by every aggregate write.
///
/// The caller runs its own steps against the transaction returned by
/// [`begin`](Self::begin), marking progress with [`advance`](Self::advance),
/// then hands the outcome to [`conclude`](Self::conclude). A failed outcome
/// deletes this attempt's staged files, rolls back, and returns the original
/// error.
///
/// An attempt dropped before `conclude` (request timeout, client gone) rolls
/// back through the transaction's own drop, and removes any files it started
/// uploading from a spawned task.
pub struct WriteAttempt {
    operation: &'static str,
    stage: WriteStage,
    uploads: Option<StagedUploads>,
    upload_started: bool,
}

impl WriteAttempt {
    /// Start an attempt whose file fields were already extracted.
    pub fn new(operation: &'static str, uploads: Option<StagedUploads>) -> Self {
        let mut attempt = Self {
            operation,
            stage: WriteStage::Started,
            uploads,
            upload_started: false,
        };
        attempt.advance(WriteStage::FilesExtracted);
        attempt
    }

    pub fn stage(&self) -> WriteStage {
        self.stage
    }

    /// Generated filenames of this attempt's uploads.
    pub fn staged_filenames(&self) -> Vec<String> {
        self.uploads
            .as_ref()
            .map(StagedUploads::filenames)
            .unwrap_or_default()
    }

    pub fn advance(&mut self, to: WriteStage) {
        debug!(operation = self.operation, from = ?self.stage, to = ?to, "Write stage");
        self.stage = to;
    }

    pub async fn begin(&self, db: &DatabaseConnection) -> Result<DatabaseTransaction, AppError> {
        Ok(db.begin().await?)
    }

    /// Upload every staged file into its directory.
    pub async fn upload_staged(&mut self) -> Result<(), AppError> {
        if let Some(uploads) = &self.uploads {
            self.upload_started = !uploads.files.is_empty();
            uploads.dir.upload_files(&uploads.files).await?;
        }
        self.advance(WriteStage::FilesUploaded);
        Ok(())
    }

    /// Commit on success; otherwise compensate and return the original error.
    pub async fn conclude<T>(
        mut self,
        txn: DatabaseTransaction,
        outcome: Result<T, AppError>,
    ) -> Result<T, AppError> {
        match outcome {
            Ok(value) => match txn.commit().await {
                Ok(()) => {
                    self.advance(WriteStage::Committed);
                    Ok(value)
                }
                Err(err) => {
                    warn!(operation = self.operation, error = %err, "Commit failed");
                    self.delete_staged().await;
                    self.advance(WriteStage::RolledBack);
                    Err(err.into())
                }
            },
            Err(err) => {
                warn!(
                    operation = self.operation,
                    stage = ?self.stage,
                    error = %err,
                    "Write failed, rolling back"
                );
                self.delete_staged().await;
                if let Err(rollback_err) = txn.rollback().await {
                    error!(
                        operation = self.operation,
                        error = %rollback_err,
                        "Failed to roll back transaction"
                    );
                }
                self.advance(WriteStage::RolledBack);
                Err(err)
            }
        }
    }

    async fn delete_staged(&self) {
        let Some(uploads) = &self.uploads else {
            return;
        };
        let deleted = uploads.dir.delete_files(&uploads.filenames()).await;
        if deleted > 0 {
            debug!(operation = self.operation, deleted, "Removed files of failed write");
        }
    }
}

impl Drop for WriteAttempt {
    fn drop(&mut self) {
        if self.stage.is_terminal() || !self.upload_started {
            return;
        }
        let Some(uploads) = self.uploads.take() else {
            return;
        };
        let names = uploads.filenames();
        warn!(
            operation = self.operation,
            stage = ?self.stage,
            files = names.len(),
            "Write abandoned before completion, removing its files"
        );
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    uploads.dir.delete_files(&names).await;
                });
            }
            Err(_) => error!(
                operation = self.operation,
                files = ?names,
                "No runtime to remove files of abandoned write"
            ),
        }
    }
}
