use std::collections::BTreeMap;

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::models::shared::split_ids;
use crate::models::video::{VideoFile, VideoPayload};
use crate::services::uploads::UploadPayload;

const ID_LIST_FIELDS: [&str; 2] = ["categories_id", "genres_id"];

/// A video write body, read from JSON or `multipart/form-data`.
pub struct VideoForm {
    pub payload: VideoPayload,
    pub files: BTreeMap<VideoFile, UploadPayload>,
}

impl<S> FromRequest<S> for VideoForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let AppJson(payload) = AppJson::<VideoPayload>::from_request(req, state).await?;
            return Ok(Self {
                payload,
                files: BTreeMap::new(),
            });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_multipart(multipart).await
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<VideoForm, AppError> {
    let mut fields = Map::new();
    let mut files = BTreeMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(|n| n.trim_end_matches("[]").to_string()) else {
            continue;
        };

        if let Some(slot) = VideoFile::from_field(&name) {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read {name}: {e}")))?;
            // Browsers send an empty part for an untouched file input.
            if bytes.is_empty() && original_name.is_empty() {
                continue;
            }
            files.insert(
                slot,
                UploadPayload {
                    original_name,
                    content_type,
                    bytes,
                },
            );
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read {name}: {e}")))?;

        if ID_LIST_FIELDS.contains(&name.as_str()) {
            let entry = fields
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.extend(split_ids(&Value::String(text)).into_iter().map(Value::String));
            }
        } else {
            fields.insert(name, Value::String(text));
        }
    }

    let payload = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?;
    Ok(VideoForm { payload, files })
}
