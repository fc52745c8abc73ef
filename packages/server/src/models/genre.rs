use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::genre;
use crate::error::FieldErrors;

use super::category::CategoryResponse;
pub use super::shared::{ListQuery, Pagination};
use super::shared::{id_list, parse_ids, validate_name};

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct GenreRequest {
    #[schema(example = "Drama")]
    pub name: Option<String>,
    /// Defaults to `true` on create.
    pub is_active: Option<bool>,
    /// Category IDs; replaces the whole set when present.
    #[serde(default, deserialize_with = "id_list")]
    #[schema(value_type = Option<Vec<String>>)]
    pub categories_id: Option<Vec<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GenreResponse {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub categories: Vec<CategoryResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Genre as embedded in other resources.
#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct GenreSummary {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GenreListResponse {
    pub data: Vec<GenreResponse>,
    pub pagination: Pagination,
}

impl GenreResponse {
    pub fn new(m: genre::Model, categories: Vec<CategoryResponse>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            is_active: m.is_active,
            categories,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        }
    }
}

impl From<genre::Model> for GenreSummary {
    fn from(m: genre::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            is_active: m.is_active,
            deleted_at: m.deleted_at,
        }
    }
}

/// Validated genre fields; `None` means unchanged.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GenreAttributes {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub categories_id: Option<Vec<Uuid>>,
}

/// Field-level checks only; category existence needs the database.
pub fn validate_genre(req: &GenreRequest, required: bool, errors: &mut FieldErrors) -> GenreAttributes {
    GenreAttributes {
        name: validate_name(errors, "name", req.name.as_deref(), required),
        is_active: req.is_active,
        categories_id: parse_ids(errors, "categories_id", req.categories_id.as_deref(), required),
    }
}
