use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::blob_path;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::utils::filename::validate_flat_filename;

#[utoipa::path(
    get,
    path = "/{dir}/{filename}",
    tag = "Files",
    operation_id = "getFile",
    summary = "Download a stored file",
    description = "Streams a file stored for an entity. The content type is guessed from the filename.",
    params(
        ("dir" = String, Path, description = "Owning entity ID"),
        ("filename" = String, Path, description = "Stored filename"),
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 400, description = "Invalid path (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_file(
    State(state): State<AppState>,
    Path((dir, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    for segment in [&dir, &filename] {
        validate_flat_filename(segment).map_err(|e| AppError::BadRequest(e.message().into()))?;
    }
    let path = blob_path(&dir, &filename);

    let size = state.blob_store.size(&path).await?;
    let reader = state.blob_store.get_stream(&path).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_path(&filename).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{filename}\""),
        )
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
