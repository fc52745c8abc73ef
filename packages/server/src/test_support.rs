use sea_orm::*;
use tempfile::TempDir;
use uuid::Uuid;

use crate::database::init_db;
use crate::entity::{category, category_genre, genre};
use crate::services::relation_sync;

/// A fresh SQLite database in its own temp directory.
///
/// Keep the returned `TempDir` alive for as long as the connection is used.
pub async fn test_db() -> (DatabaseConnection, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let db = init_db(&url, 1).await.unwrap();
    (db, dir)
}

pub async fn insert_category(db: &DatabaseConnection, name: &str) -> Uuid {
    let now = chrono::Utc::now();
    category::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.into()),
        description: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn insert_genre(db: &DatabaseConnection, name: &str, categories: &[Uuid]) -> Uuid {
    let now = chrono::Utc::now();
    let id = genre::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.into()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id;
    relation_sync::sync::<category_genre::Entity, _>(db, id, categories)
        .await
        .unwrap();
    id
}
