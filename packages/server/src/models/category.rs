use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::category;
use crate::error::{AppError, FieldErrors};

pub use super::shared::{ListQuery, Pagination};
use super::shared::{double_option, validate_name};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    /// Category name (1-255 characters).
    #[schema(example = "Documentary")]
    pub name: Option<String>,
    pub description: Option<String>,
    /// Defaults to `true`.
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, Clone, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryListResponse {
    pub data: Vec<CategoryResponse>,
    pub pagination: Pagination,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        }
    }
}

/// Validate a create payload; returns the trimmed name.
pub fn validate_create_category(req: &CreateCategoryRequest) -> Result<String, AppError> {
    let mut errors = FieldErrors::new();
    let name = validate_name(&mut errors, "name", req.name.as_deref(), true);
    errors.into_result()?;
    name.ok_or_else(|| AppError::field("name", "The name field is required."))
}

/// Validate an update payload; returns the trimmed name when one was sent.
pub fn validate_update_category(req: &UpdateCategoryRequest) -> Result<Option<String>, AppError> {
    let mut errors = FieldErrors::new();
    let name = validate_name(&mut errors, "name", req.name.as_deref(), false);
    errors.into_result()?;
    Ok(name)
}
