use common::Rating;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    /// UUIDv7 primary key, also the blob directory of the video's files.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub year_launched: i32,
    pub opened: bool,
    pub rating: Rating,
    pub duration: i32, // in minutes

    // Generated filenames under `{id}/`, never raw bytes.
    pub thumb_file: Option<String>,
    pub banner_file: Option<String>,
    pub trailer_file: Option<String>,
    pub video_file: Option<String>,

    #[sea_orm(has_many, via = "category_video")]
    pub categories: HasMany<super::category::Entity>,

    #[sea_orm(has_many, via = "genre_video")]
    pub genres: HasMany<super::genre::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
