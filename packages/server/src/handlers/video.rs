use axum::Json;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use super::{fetch_page, search, sort_column};
use crate::entity::{category, category_video, genre, genre_video, video};
use crate::error::{AppError, ErrorBody, FieldErrors};
use crate::extractors::video_form::VideoForm;
use crate::models::category::CategoryResponse;
use crate::models::genre::GenreSummary;
use crate::models::video::*;
use crate::rules::GenresHasCategories;
use crate::services::relation_sync::related_ids;
use crate::services::video::{VideoRelations, VideoWriter, find_video};
use crate::state::AppState;
use crate::utils::lookup::{SoftDelete, check_exists, soft_delete};

/// Body limit for video writes, which may carry every file slot at once.
pub fn video_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(usize::try_from(max_upload_size).unwrap_or(usize::MAX))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Videos",
    operation_id = "listVideos",
    summary = "List videos with pagination and search",
    description = "Returns a paginated list of videos that have not been deleted, with their categories and genres. Supports case-insensitive title search and sorting by `created_at` (default, desc), `updated_at`, `title`, `year_launched`, or `duration`.",
    params(ListQuery),
    responses(
        (status = 200, description = "List of videos", body = VideoListResponse),
        (status = 422, description = "Invalid sort column (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<VideoListResponse>, AppError> {
    let sort = sort_column(
        &query,
        &[
            ("created_at", video::Column::CreatedAt),
            ("updated_at", video::Column::UpdatedAt),
            ("title", video::Column::Title),
            ("year_launched", video::Column::YearLaunched),
            ("duration", video::Column::Duration),
        ],
    )?;
    let select = search(video::Entity::find_live(), video::Column::Title, &query);
    let (items, pagination) = fetch_page(&state.db, select, &query, sort).await?;

    let ids: Vec<Uuid> = items.iter().map(|v| v.id).collect();
    let relations = VideoRelations::load(&state.db, &ids).await?;
    let data = items
        .into_iter()
        .map(|v| to_response(&state, v, &relations))
        .collect();

    Ok(Json(VideoListResponse { data, pagination }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Videos",
    operation_id = "createVideo",
    summary = "Create a video",
    description = "Accepts `application/json` or `multipart/form-data`. Multipart bodies may carry `thumb_file`, `banner_file`, `trailer_file` and `video_file` parts and repeated `categories_id[]`/`genres_id[]` fields. Every genre must share at least one category with `categories_id`. The record, its relations and its files are written atomically.",
    request_body(content(
        (VideoPayload = "application/json"),
        (VideoPayload = "multipart/form-data"),
    )),
    responses(
        (status = 201, description = "Video created", body = VideoResponse),
        (status = 400, description = "Malformed body (BAD_REQUEST)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_video(
    State(state): State<AppState>,
    form: VideoForm,
) -> Result<impl IntoResponse, AppError> {
    let mut errors = FieldErrors::new();
    let attrs = validate_video(&form.payload, form.files, true, &mut errors);
    check_relations(&state.db, &attrs, None, &mut errors).await?;
    errors.into_result()?;

    let model = VideoWriter::new(&state.db, state.blob_store.clone())
        .create(attrs)
        .await?;
    let response = load_response(&state, model).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Videos",
    operation_id = "getVideo",
    summary = "Get a video by ID",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video details", body = VideoResponse),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VideoResponse>, AppError> {
    let model = find_video(&state.db, id).await?;
    Ok(Json(load_response(&state, model).await?))
}

#[utoipa::path(
    method(put, patch),
    path = "/{id}",
    tag = "Videos",
    operation_id = "updateVideo",
    summary = "Update a video",
    description = "Only provided fields are modified. A present `categories_id` or `genres_id` replaces that whole set; when only one of them is sent, the genre/category rule is checked against the stored other set. Replaced files are deleted once the update has committed.",
    params(("id" = Uuid, Path, description = "Video ID")),
    request_body(content(
        (VideoPayload = "application/json"),
        (VideoPayload = "multipart/form-data"),
    )),
    responses(
        (status = 200, description = "Video updated", body = VideoResponse),
        (status = 400, description = "Malformed body (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(id = %id))]
pub async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    form: VideoForm,
) -> Result<Json<VideoResponse>, AppError> {
    find_video(&state.db, id).await?;

    let mut errors = FieldErrors::new();
    let attrs = validate_video(&form.payload, form.files, false, &mut errors);
    check_relations(&state.db, &attrs, Some(id), &mut errors).await?;
    errors.into_result()?;

    let model = VideoWriter::new(&state.db, state.blob_store.clone())
        .update(id, attrs)
        .await?;
    Ok(Json(load_response(&state, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Soft-delete a video",
    description = "Marks the video as deleted. Its relations and stored files are kept.",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !soft_delete::<video::Entity, _>(&state.db, id).await? {
        return Err(AppError::NotFound("Video not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Existence of the referenced IDs, then the genre/category rule.
///
/// `existing` is the video being updated; a list missing from the request is
/// taken from its stored relations.
async fn check_relations(
    db: &DatabaseConnection,
    attrs: &VideoAttributes,
    existing: Option<Uuid>,
    errors: &mut FieldErrors,
) -> Result<(), AppError> {
    if let Some(ids) = &attrs.categories_id {
        check_exists::<category::Entity, _>(db, errors, "categories_id", ids).await?;
    }
    if let Some(ids) = &attrs.genres_id {
        check_exists::<genre::Entity, _>(db, errors, "genres_id", ids).await?;
    }
    if errors.has("categories_id") || errors.has("genres_id") {
        return Ok(());
    }

    let (categories, genres) = match (&attrs.categories_id, &attrs.genres_id, existing) {
        (None, None, _) => return Ok(()),
        (Some(c), Some(g), _) => (c.clone(), g.clone()),
        (Some(c), None, Some(id)) => (c.clone(), related_ids::<genre_video::Entity, _>(db, id).await?),
        (None, Some(g), Some(id)) => (
            related_ids::<category_video::Entity, _>(db, id).await?,
            g.clone(),
        ),
        // Creates always carry both lists once field validation passed.
        (_, _, None) => return Ok(()),
    };

    if !GenresHasCategories::new(&categories).passes(db, &genres).await? {
        errors.add("genres_id", GenresHasCategories::MESSAGE);
    }
    Ok(())
}

async fn load_response(state: &AppState, model: video::Model) -> Result<VideoResponse, AppError> {
    let relations = VideoRelations::load(&state.db, &[model.id]).await?;
    Ok(to_response(state, model, &relations))
}

fn to_response(state: &AppState, model: video::Model, relations: &VideoRelations) -> VideoResponse {
    let categories = relations
        .categories_of(model.id)
        .into_iter()
        .map(CategoryResponse::from)
        .collect();
    let genres = relations
        .genres_of(model.id)
        .into_iter()
        .map(GenreSummary::from)
        .collect();
    let storage = &state.config.storage;
    VideoResponse::new(model, categories, genres, |dir, name| storage.file_url(dir, name))
}
