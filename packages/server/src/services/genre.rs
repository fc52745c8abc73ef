use std::collections::HashMap;

use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::entity::{category, category_genre, genre};
use crate::error::AppError;
use crate::models::genre::GenreAttributes;
use crate::services::relation_sync::{self, SyncChanges};
use crate::services::write::{WriteAttempt, WriteStage};

/// Creates and updates genres together with their category links.
pub struct GenreWriter<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GenreWriter<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, attrs: GenreAttributes) -> Result<genre::Model, AppError> {
        let name = attrs
            .name
            .clone()
            .ok_or_else(|| AppError::field("name", "The name field is required."))?;
        let id = Uuid::now_v7();
        let mut attempt = WriteAttempt::new("genre.create", None);

        let txn = attempt.begin(self.db).await?;
        let outcome = async {
            let now = chrono::Utc::now();
            let model = genre::ActiveModel {
                id: Set(id),
                name: Set(name),
                is_active: Set(attrs.is_active.unwrap_or(true)),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            attempt.advance(WriteStage::RecordPersisted);

            let changes = sync_categories(&txn, id, &attrs).await?;
            attempt.advance(WriteStage::RelationsSynced);
            Ok::<_, AppError>((model, changes))
        }
        .await;

        let (model, changes) = attempt.conclude(txn, outcome).await?;
        info!(genre_id = %model.id, categories = changes.attached.len(), "Created genre");
        Ok(model)
    }

    pub async fn update(&self, id: Uuid, attrs: GenreAttributes) -> Result<genre::Model, AppError> {
        let existing = find_genre(self.db, id).await?;
        let mut attempt = WriteAttempt::new("genre.update", None);

        let txn = attempt.begin(self.db).await?;
        let outcome = async {
            let mut active: genre::ActiveModel = existing.into();
            if let Some(name) = &attrs.name {
                active.name = Set(name.clone());
            }
            if let Some(is_active) = attrs.is_active {
                active.is_active = Set(is_active);
            }
            active.updated_at = Set(chrono::Utc::now());
            let model = active.update(&txn).await?;
            attempt.advance(WriteStage::RecordPersisted);

            let changes = sync_categories(&txn, id, &attrs).await?;
            attempt.advance(WriteStage::RelationsSynced);
            Ok::<_, AppError>((model, changes))
        }
        .await;

        let (model, changes) = attempt.conclude(txn, outcome).await?;
        info!(
            genre_id = %model.id,
            attached = changes.attached.len(),
            detached = changes.detached.len(),
            "Updated genre"
        );
        Ok(model)
    }
}

async fn sync_categories<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    attrs: &GenreAttributes,
) -> Result<SyncChanges, DbErr> {
    match &attrs.categories_id {
        Some(categories) => relation_sync::sync::<category_genre::Entity, _>(db, id, categories).await,
        None => Ok(SyncChanges::default()),
    }
}

/// Look up a genre that has not been soft-deleted.
pub async fn find_genre<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<genre::Model, AppError> {
    genre::Entity::find_by_id(id)
        .filter(genre::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Genre not found".into()))
}

/// Categories linked to each genre, soft-deleted ones included.
pub async fn load_categories<C: ConnectionTrait>(
    db: &C,
    genre_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<category::Model>>, DbErr> {
    let links = relation_sync::links::<category_genre::Entity, _>(db, genre_ids).await?;
    let category_ids = relation_sync::related_of(&links);
    let categories = category::Entity::find()
        .filter(category::Column::Id.is_in(category_ids))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;
    Ok(relation_sync::group_by_owner(&links, categories, |c| c.id))
}
