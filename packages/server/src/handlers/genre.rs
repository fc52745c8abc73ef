use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::{fetch_page, search, sort_column};
use crate::entity::{category, genre};
use crate::error::{AppError, ErrorBody, FieldErrors};
use crate::extractors::json::AppJson;
use crate::models::category::CategoryResponse;
use crate::models::genre::*;
use crate::services::genre::{GenreWriter, find_genre, load_categories};
use crate::state::AppState;
use crate::utils::lookup::{SoftDelete, check_exists, soft_delete};

#[utoipa::path(
    get,
    path = "/",
    tag = "Genres",
    operation_id = "listGenres",
    summary = "List genres with pagination and search",
    description = "Returns a paginated list of genres that have not been deleted, each with its categories. Sortable by `created_at` (default, desc), `updated_at`, or `name`.",
    params(ListQuery),
    responses(
        (status = 200, description = "List of genres", body = GenreListResponse),
        (status = 422, description = "Invalid sort column (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_genres(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<GenreListResponse>, AppError> {
    let sort = sort_column(
        &query,
        &[
            ("created_at", genre::Column::CreatedAt),
            ("updated_at", genre::Column::UpdatedAt),
            ("name", genre::Column::Name),
        ],
    )?;
    let select = search(genre::Entity::find_live(), genre::Column::Name, &query);
    let (items, pagination) = fetch_page(&state.db, select, &query, sort).await?;

    let ids: Vec<Uuid> = items.iter().map(|g| g.id).collect();
    let mut categories = load_categories(&state.db, &ids).await?;
    let data = items
        .into_iter()
        .map(|g| {
            let linked = categories.remove(&g.id).unwrap_or_default();
            GenreResponse::new(g, linked.into_iter().map(CategoryResponse::from).collect())
        })
        .collect();

    Ok(Json(GenreListResponse { data, pagination }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Genres",
    operation_id = "createGenre",
    summary = "Create a genre",
    description = "`categories_id` must list at least one existing, non-deleted category.",
    request_body = GenreRequest,
    responses(
        (status = 201, description = "Genre created", body = GenreResponse),
        (status = 400, description = "Malformed body (BAD_REQUEST)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_genre(
    State(state): State<AppState>,
    AppJson(payload): AppJson<GenreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attrs = validate(&state.db, &payload, true).await?;
    let model = GenreWriter::new(&state.db).create(attrs).await?;
    let response = with_categories(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Genres",
    operation_id = "getGenre",
    summary = "Get a genre by ID",
    params(("id" = Uuid, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre details", body = GenreResponse),
        (status = 404, description = "Genre not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GenreResponse>, AppError> {
    let model = find_genre(&state.db, id).await?;
    Ok(Json(with_categories(&state.db, model).await?))
}

#[utoipa::path(
    method(put, patch),
    path = "/{id}",
    tag = "Genres",
    operation_id = "updateGenre",
    summary = "Update a genre",
    description = "Only provided fields are modified. A present `categories_id` replaces the whole category set.",
    params(("id" = Uuid, Path, description = "Genre ID")),
    request_body = GenreRequest,
    responses(
        (status = 200, description = "Genre updated", body = GenreResponse),
        (status = 404, description = "Genre not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id = %id))]
pub async fn update_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<GenreRequest>,
) -> Result<Json<GenreResponse>, AppError> {
    find_genre(&state.db, id).await?;
    let attrs = validate(&state.db, &payload, false).await?;
    let model = GenreWriter::new(&state.db).update(id, attrs).await?;
    Ok(Json(with_categories(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Genres",
    operation_id = "deleteGenre",
    summary = "Soft-delete a genre",
    params(("id" = Uuid, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !soft_delete::<genre::Entity, _>(&state.db, id).await? {
        return Err(AppError::NotFound("Genre not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn validate(
    db: &DatabaseConnection,
    payload: &GenreRequest,
    required: bool,
) -> Result<GenreAttributes, AppError> {
    let mut errors = FieldErrors::new();
    let attrs = validate_genre(payload, required, &mut errors);
    if let Some(ids) = &attrs.categories_id {
        check_exists::<category::Entity, _>(db, &mut errors, "categories_id", ids).await?;
    }
    errors.into_result()?;
    Ok(attrs)
}

async fn with_categories(
    db: &DatabaseConnection,
    model: genre::Model,
) -> Result<GenreResponse, AppError> {
    let categories = load_categories(db, &[model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    Ok(GenreResponse::new(
        model,
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}
