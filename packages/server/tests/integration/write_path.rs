//! Calls the video write service directly with a blob store that can be told
//! to fail or hang, to observe the compensating path end to end.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use common::Rating;
use common::storage::memory::MemoryBlobStore;
use common::storage::{BlobStore, BoxReader, StorageError};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tempfile::TempDir;
use uuid::Uuid;

use catalog_server::entity::{category, category_video, genre_video, video};
use catalog_server::error::AppError;
use catalog_server::models::genre::GenreAttributes;
use catalog_server::models::video::{VideoAttributes, VideoFile};
use catalog_server::services::genre::GenreWriter;
use catalog_server::services::uploads::{FileValue, UploadPayload};
use catalog_server::services::video::VideoWriter;

/// Memory store that accepts `allowed_puts` more writes, then fails or hangs.
struct FaultyStore {
    inner: MemoryBlobStore,
    allowed_puts: AtomicUsize,
    hang: AtomicBool,
}

impl FaultyStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryBlobStore::new(),
            allowed_puts: AtomicUsize::new(usize::MAX),
            hang: AtomicBool::new(false),
        })
    }

    fn fail_after(&self, puts: usize) {
        self.allowed_puts.store(puts, Ordering::SeqCst);
    }

    /// Later writes never complete instead of failing.
    fn hang_after(&self, puts: usize) {
        self.hang.store(true, Ordering::SeqCst);
        self.fail_after(puts);
    }
}

#[async_trait]
impl BlobStore for FaultyStore {
    async fn put_stream(&self, path: &str, reader: BoxReader) -> Result<u64, StorageError> {
        let granted = self
            .allowed_puts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if granted.is_err() {
            if self.hang.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            return Err(StorageError::Io(std::io::Error::other("injected write failure")));
        }
        self.inner.put_stream(path, reader).await
    }
    async fn get_stream(&self, path: &str) -> Result<BoxReader, StorageError> {
        self.inner.get_stream(path).await
    }
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        self.inner.exists(path).await
    }
    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        self.inner.delete(path).await
    }
    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        self.inner.size(path).await
    }
    async fn all_files(&self) -> Result<Vec<String>, StorageError> {
        self.inner.all_files().await
    }
}

struct Fixture {
    db: DatabaseConnection,
    category: Uuid,
    genre: Uuid,
    _dir: TempDir,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("write.db").display());
    let db = catalog_server::database::init_db(&url, 1).await.unwrap();

    let now = chrono::Utc::now();
    let category = category::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set("C1".into()),
        description: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap()
    .id;
    let genre = GenreWriter::new(&db)
        .create(GenreAttributes {
            name: Some("G1".into()),
            is_active: None,
            categories_id: Some(vec![category]),
        })
        .await
        .unwrap()
        .id;

    Fixture {
        db,
        category,
        genre,
        _dir: dir,
    }
}

fn upload(name: &str, bytes: &'static [u8]) -> FileValue {
    FileValue::Upload(UploadPayload {
        original_name: name.into(),
        content_type: None,
        bytes: Bytes::from_static(bytes),
    })
}

fn attrs(categories: Vec<Uuid>, genres: Vec<Uuid>) -> VideoAttributes {
    VideoAttributes {
        title: Some("Title".into()),
        description: Some("Description".into()),
        year_launched: Some(2001),
        opened: Some(true),
        rating: Some(Rating::Age12),
        duration: Some(120),
        categories_id: Some(categories),
        genres_id: Some(genres),
        ..Default::default()
    }
}

async fn row_counts(db: &DatabaseConnection) -> (u64, u64, u64) {
    (
        video::Entity::find().count(db).await.unwrap(),
        category_video::Entity::find().count(db).await.unwrap(),
        genre_video::Entity::find().count(db).await.unwrap(),
    )
}

#[tokio::test]
async fn relation_failure_during_create_leaves_no_trace() {
    let f = fixture().await;
    let store = FaultyStore::new();

    let mut input = attrs(vec![f.category], vec![Uuid::now_v7()]);
    input.files.insert(VideoFile::Thumb, upload("a.jpg", b"jpg"));
    let err = VideoWriter::new(&f.db, store.clone()).create(input).await.unwrap_err();

    assert!(matches!(err, AppError::Persistence(_)), "unexpected error: {err}");
    assert_eq!(row_counts(&f.db).await, (0, 0, 0));
    assert!(store.all_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_failure_during_create_rolls_back() {
    let f = fixture().await;
    let store = FaultyStore::new();
    store.fail_after(0);

    let mut input = attrs(vec![f.category], vec![f.genre]);
    input.files.insert(VideoFile::Video, upload("v.mp4", b"mp4"));
    let err = VideoWriter::new(&f.db, store.clone()).create(input).await.unwrap_err();

    assert!(matches!(err, AppError::Storage(StorageError::Io(_))), "unexpected error: {err}");
    assert_eq!(row_counts(&f.db).await, (0, 0, 0));
}

#[tokio::test]
async fn partial_upload_failure_removes_files_already_written() {
    let f = fixture().await;
    let store = FaultyStore::new();
    let writer = VideoWriter::new(&f.db, store.clone());

    let mut first = attrs(vec![f.category], vec![f.genre]);
    first.files.insert(VideoFile::Thumb, upload("a.jpg", b"old"));
    let created = writer.create(first).await.unwrap();
    let old = format!("{}/{}", created.id, created.thumb_file.clone().unwrap());

    // Thumb is written first in field order; the trailer write then fails.
    store.fail_after(1);
    let mut changes = VideoAttributes::default();
    changes.files.insert(VideoFile::Thumb, upload("b.jpg", b"new"));
    changes.files.insert(VideoFile::Trailer, upload("t.mp4", b"mp4"));
    let err = writer.update(created.id, changes).await.unwrap_err();

    assert!(matches!(err, AppError::Storage(StorageError::Io(_))), "unexpected error: {err}");
    assert_eq!(store.all_files().await.unwrap(), vec![old]);
    let reloaded = video::Entity::find_by_id(created.id)
        .one(&f.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.thumb_file, created.thumb_file);
    assert_eq!(reloaded.trailer_file, None);
}

#[tokio::test]
async fn timed_out_create_removes_files_already_written() {
    let f = fixture().await;
    let store = FaultyStore::new();
    store.hang_after(1);

    let mut input = attrs(vec![f.category], vec![f.genre]);
    input.files.insert(VideoFile::Thumb, upload("a.jpg", b"jpg"));
    input.files.insert(VideoFile::Trailer, upload("t.mp4", b"mp4"));
    let writer = VideoWriter::new(&f.db, store.clone());
    let outcome = tokio::time::timeout(Duration::from_millis(300), writer.create(input)).await;
    assert!(outcome.is_err(), "the trailer write never completes");

    let mut remaining = store.all_files().await.unwrap();
    for _ in 0..50 {
        if remaining.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        remaining = store.all_files().await.unwrap();
    }
    assert!(remaining.is_empty(), "files left behind: {remaining:?}");
    assert_eq!(row_counts(&f.db).await, (0, 0, 0));
}
