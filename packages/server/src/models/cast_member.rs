use chrono::{DateTime, Utc};
use common::CastMemberType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::cast_member;
use crate::error::{AppError, FieldErrors};

pub use super::shared::{ListQuery, Pagination};
use super::shared::validate_name;

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct CastMemberRequest {
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    /// 1 = director, 2 = actor.
    #[serde(rename = "type")]
    #[schema(example = 2)]
    pub member_type: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CastMemberResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    #[schema(value_type = i32, example = 2)]
    pub member_type: CastMemberType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CastMemberListResponse {
    pub data: Vec<CastMemberResponse>,
    pub pagination: Pagination,
}

impl From<cast_member::Model> for CastMemberResponse {
    fn from(m: cast_member::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            member_type: m.member_type,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        }
    }
}

/// Validated cast member fields; `None` means unchanged.
#[derive(Debug, PartialEq)]
pub struct CastMemberFields {
    pub name: Option<String>,
    pub member_type: Option<CastMemberType>,
}

pub fn validate_cast_member(
    req: &CastMemberRequest,
    required: bool,
) -> Result<CastMemberFields, AppError> {
    let mut errors = FieldErrors::new();
    let name = validate_name(&mut errors, "name", req.name.as_deref(), required);

    let member_type = match req.member_type {
        None => {
            if required {
                errors.add("type", "The type field is required.");
            }
            None
        }
        Some(code) => match CastMemberType::try_from(code) {
            Ok(t) => Some(t),
            Err(_) => {
                errors.add("type", "The selected type is invalid.");
                None
            }
        },
    };

    errors.into_result()?;
    Ok(CastMemberFields { name, member_type })
}
