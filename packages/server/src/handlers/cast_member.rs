use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::{fetch_page, search, sort_column};
use crate::entity::cast_member;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::cast_member::*;
use crate::state::AppState;
use crate::utils::lookup::{SoftDelete, soft_delete};

#[utoipa::path(
    get,
    path = "/",
    tag = "Cast Members",
    operation_id = "listCastMembers",
    summary = "List cast members with pagination and search",
    description = "Returns a paginated list of cast members that have not been deleted. Sortable by `created_at` (default, desc), `updated_at`, `name`, or `type`.",
    params(ListQuery),
    responses(
        (status = 200, description = "List of cast members", body = CastMemberListResponse),
        (status = 422, description = "Invalid sort column (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_cast_members(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CastMemberListResponse>, AppError> {
    let sort = sort_column(
        &query,
        &[
            ("created_at", cast_member::Column::CreatedAt),
            ("updated_at", cast_member::Column::UpdatedAt),
            ("name", cast_member::Column::Name),
            ("type", cast_member::Column::MemberType),
        ],
    )?;
    let select = search(cast_member::Entity::find_live(), cast_member::Column::Name, &query);
    let (items, pagination) = fetch_page(&state.db, select, &query, sort).await?;

    Ok(Json(CastMemberListResponse {
        data: items.into_iter().map(CastMemberResponse::from).collect(),
        pagination,
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Cast Members",
    operation_id = "createCastMember",
    summary = "Create a cast member",
    description = "`type` is 1 for a director and 2 for an actor.",
    request_body = CastMemberRequest,
    responses(
        (status = 201, description = "Cast member created", body = CastMemberResponse),
        (status = 400, description = "Malformed body (BAD_REQUEST)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_cast_member(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CastMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let CastMemberFields {
        name: Some(name),
        member_type: Some(member_type),
    } = validate_cast_member(&payload, true)?
    else {
        return Err(AppError::Internal("validated cast member is incomplete".into()));
    };

    let now = chrono::Utc::now();
    let model = cast_member::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name),
        member_type: Set(member_type),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(CastMemberResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Cast Members",
    operation_id = "getCastMember",
    summary = "Get a cast member by ID",
    params(("id" = Uuid, Path, description = "Cast member ID")),
    responses(
        (status = 200, description = "Cast member details", body = CastMemberResponse),
        (status = 404, description = "Cast member not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_cast_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CastMemberResponse>, AppError> {
    let model = find_cast_member(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    method(put, patch),
    path = "/{id}",
    tag = "Cast Members",
    operation_id = "updateCastMember",
    summary = "Update a cast member",
    description = "Only provided fields are modified.",
    params(("id" = Uuid, Path, description = "Cast member ID")),
    request_body = CastMemberRequest,
    responses(
        (status = 200, description = "Cast member updated", body = CastMemberResponse),
        (status = 404, description = "Cast member not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id = %id))]
pub async fn update_cast_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CastMemberRequest>,
) -> Result<Json<CastMemberResponse>, AppError> {
    let existing = find_cast_member(&state.db, id).await?;
    let fields = validate_cast_member(&payload, false)?;

    if payload == CastMemberRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: cast_member::ActiveModel = existing.into();
    if let Some(name) = fields.name {
        active.name = Set(name);
    }
    if let Some(member_type) = fields.member_type {
        active.member_type = Set(member_type);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Cast Members",
    operation_id = "deleteCastMember",
    summary = "Soft-delete a cast member",
    params(("id" = Uuid, Path, description = "Cast member ID")),
    responses(
        (status = 204, description = "Cast member deleted"),
        (status = 404, description = "Cast member not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn delete_cast_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !soft_delete::<cast_member::Entity, _>(&state.db, id).await? {
        return Err(AppError::NotFound("Cast member not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn find_cast_member<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<cast_member::Model, AppError> {
    cast_member::Entity::find_live()
        .filter(cast_member::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Cast member not found".into()))
}
