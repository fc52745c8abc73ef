use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "genre_video")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub genre_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub video_id: Uuid,
    #[sea_orm(belongs_to, from = "genre_id", to = "id")]
    pub genre: Option<super::genre::Entity>,
    #[sea_orm(belongs_to, from = "video_id", to = "id")]
    pub video: Option<super::video::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
