use std::collections::HashMap;
use std::sync::Arc;

use common::storage::BlobStore;
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::entity::{category, category_video, genre, genre_video, video};
use crate::error::AppError;
use crate::models::video::{VideoAttributes, VideoFile};
use crate::services::relation_sync::{self, group_by_owner};
use crate::services::uploads::{UploadDir, extract_files};
use crate::services::write::{StagedUploads, WriteAttempt, WriteStage};

/// Creates and updates videos together with their relations and files.
pub struct VideoWriter<'a> {
    db: &'a DatabaseConnection,
    store: Arc<dyn BlobStore>,
}

impl<'a> VideoWriter<'a> {
    pub fn new(db: &'a DatabaseConnection, store: Arc<dyn BlobStore>) -> Self {
        Self { db, store }
    }

    /// Insert a new video.
    ///
    /// Relations present in `attrs` are synced and uploads stored under the
    /// new video's directory, all inside one transaction.
    pub async fn create(&self, mut attrs: VideoAttributes) -> Result<video::Model, AppError> {
        let id = Uuid::now_v7();
        let dir = UploadDir::new(self.store.clone(), id.to_string());
        let staged = extract_files(&mut attrs.files);
        let mut attempt = WriteAttempt::new("video.create", Some(StagedUploads { dir, files: staged }));

        let txn = attempt.begin(self.db).await?;
        let outcome = async {
            let now = chrono::Utc::now();
            let mut active = video::ActiveModel {
                id: Set(id),
                opened: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            };
            attrs.apply(&mut active);
            let model = active.insert(&txn).await?;
            attempt.advance(WriteStage::RecordPersisted);

            let relation_rows = sync_relations(&txn, id, &attrs).await?;
            attempt.advance(WriteStage::RelationsSynced);

            attempt.upload_staged().await?;
            Ok::<_, AppError>((model, relation_rows))
        }
        .await;

        let (model, relation_rows) = attempt.conclude(txn, outcome).await?;
        info!(video_id = %model.id, relation_rows, "Created video");
        Ok(model)
    }

    /// Apply `attrs` to an existing video.
    ///
    /// Files replaced by this update are deleted only after the commit.
    pub async fn update(&self, id: Uuid, mut attrs: VideoAttributes) -> Result<video::Model, AppError> {
        let existing = find_video(self.db, id).await?;
        let before = VideoFile::snapshot(&existing);

        let dir = UploadDir::new(self.store.clone(), id.to_string());
        let staged = extract_files(&mut attrs.files);
        let has_uploads = !staged.is_empty();
        let mut attempt = WriteAttempt::new(
            "video.update",
            Some(StagedUploads {
                dir: dir.clone(),
                files: staged,
            }),
        );

        let txn = attempt.begin(self.db).await?;
        let outcome = async {
            let mut active: video::ActiveModel = existing.into();
            attrs.apply(&mut active);
            active.updated_at = Set(chrono::Utc::now());
            let model = active.update(&txn).await?;
            attempt.advance(WriteStage::RecordPersisted);

            let relation_rows = sync_relations(&txn, id, &attrs).await?;
            attempt.advance(WriteStage::RelationsSynced);

            attempt.upload_staged().await?;
            Ok::<_, AppError>((model, relation_rows))
        }
        .await;

        let (model, relation_rows) = attempt.conclude(txn, outcome).await?;
        if has_uploads {
            dir.delete_old_files(&before, &VideoFile::snapshot(&model)).await;
        }
        info!(video_id = %model.id, relation_rows, "Updated video");
        Ok(model)
    }
}

/// Sync the relation lists present in `attrs`; returns the rows written.
async fn sync_relations<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    attrs: &VideoAttributes,
) -> Result<usize, DbErr> {
    let mut written = 0;
    if let Some(categories) = &attrs.categories_id {
        written += relation_sync::sync::<category_video::Entity, _>(db, id, categories)
            .await?
            .len();
    }
    if let Some(genres) = &attrs.genres_id {
        written += relation_sync::sync::<genre_video::Entity, _>(db, id, genres)
            .await?
            .len();
    }
    Ok(written)
}

/// Look up a video that has not been soft-deleted.
pub async fn find_video<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<video::Model, AppError> {
    video::Entity::find_by_id(id)
        .filter(video::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}

/// Categories and genres linked to each video, soft-deleted ones included.
pub struct VideoRelations {
    pub categories: HashMap<Uuid, Vec<category::Model>>,
    pub genres: HashMap<Uuid, Vec<genre::Model>>,
}

impl VideoRelations {
    pub async fn load<C: ConnectionTrait>(db: &C, video_ids: &[Uuid]) -> Result<Self, DbErr> {
        let category_links = relation_sync::links::<category_video::Entity, _>(db, video_ids).await?;
        let genre_links = relation_sync::links::<genre_video::Entity, _>(db, video_ids).await?;

        let category_ids = relation_sync::related_of(&category_links);
        let genre_ids = relation_sync::related_of(&genre_links);

        let categories = category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .order_by_asc(category::Column::Name)
            .all(db)
            .await?;
        let genres = genre::Entity::find()
            .filter(genre::Column::Id.is_in(genre_ids))
            .order_by_asc(genre::Column::Name)
            .all(db)
            .await?;

        Ok(Self {
            categories: group_by_owner(&category_links, categories, |c| c.id),
            genres: group_by_owner(&genre_links, genres, |g| g.id),
        })
    }

    pub fn categories_of(&self, video: Uuid) -> Vec<category::Model> {
        self.categories.get(&video).cloned().unwrap_or_default()
    }

    pub fn genres_of(&self, video: Uuid) -> Vec<genre::Model> {
        self.genres.get(&video).cloned().unwrap_or_default()
    }
}
