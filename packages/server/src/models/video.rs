use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::Rating;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::video;
use crate::error::FieldErrors;
use crate::services::uploads::{FileField, FileValue, UploadPayload};

use super::category::CategoryResponse;
use super::genre::GenreSummary;
pub use super::shared::{ListQuery, Pagination};
use super::shared::{id_list, lenient_bool, lenient_i64, parse_ids, validate_name};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// The four file slots of a video, in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VideoFile {
    Thumb,
    Banner,
    Trailer,
    Video,
}

impl VideoFile {
    pub const ALL: [VideoFile; 4] = [Self::Thumb, Self::Banner, Self::Trailer, Self::Video];

    pub fn from_field(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn max_size(self) -> u64 {
        match self {
            Self::Thumb => 5 * MIB,
            Self::Banner => 10 * MIB,
            Self::Trailer => GIB,
            Self::Video => 50 * GIB,
        }
    }

    /// Whether `content_type` is acceptable for this slot.
    pub fn accepts(self, content_type: &str) -> bool {
        match self {
            Self::Thumb | Self::Banner => content_type.starts_with("image/"),
            Self::Trailer | Self::Video => content_type == "video/mp4",
        }
    }

    fn type_message(self) -> String {
        match self {
            Self::Thumb | Self::Banner => format!("The {} must be an image.", self.name()),
            Self::Trailer | Self::Video => {
                format!("The {} must be a file of type: video/mp4.", self.name())
            }
        }
    }

    /// Stored filename of this slot on `model`.
    pub fn get(self, model: &video::Model) -> Option<&str> {
        match self {
            Self::Thumb => model.thumb_file.as_deref(),
            Self::Banner => model.banner_file.as_deref(),
            Self::Trailer => model.trailer_file.as_deref(),
            Self::Video => model.video_file.as_deref(),
        }
    }

    pub fn set(self, active: &mut video::ActiveModel, filename: Option<String>) {
        match self {
            Self::Thumb => active.thumb_file = Set(filename),
            Self::Banner => active.banner_file = Set(filename),
            Self::Trailer => active.trailer_file = Set(filename),
            Self::Video => active.video_file = Set(filename),
        }
    }

    /// File field values of `model` in field order.
    pub fn snapshot(model: &video::Model) -> Vec<Option<String>> {
        Self::ALL
            .iter()
            .map(|f| f.get(model).map(str::to_string))
            .collect()
    }
}

impl FileField for VideoFile {
    fn name(self) -> &'static str {
        match self {
            Self::Thumb => "thumb_file",
            Self::Banner => "banner_file",
            Self::Trailer => "trailer_file",
            Self::Video => "video_file",
        }
    }
}

/// Raw video fields as received in a JSON or multipart body.
///
/// Scalars are kept loose so that malformed values surface as field errors
/// rather than body parse failures.
#[derive(Deserialize, Default, Debug, utoipa::ToSchema)]
pub struct VideoPayload {
    #[schema(example = "The Long Take")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<i32>, example = 2020)]
    pub year_launched: Option<Value>,
    #[schema(value_type = Option<bool>)]
    pub opened: Option<Value>,
    #[schema(example = "L")]
    pub rating: Option<String>,
    /// Duration in minutes.
    #[schema(value_type = Option<i32>, example = 90)]
    pub duration: Option<Value>,
    #[serde(default, deserialize_with = "id_list")]
    #[schema(value_type = Option<Vec<String>>)]
    pub categories_id: Option<Vec<String>>,
    #[serde(default, deserialize_with = "id_list")]
    #[schema(value_type = Option<Vec<String>>)]
    pub genres_id: Option<Vec<String>>,
}

/// Validated video attributes; `None` means absent (unchanged on update).
#[derive(Debug, Default, Clone)]
pub struct VideoAttributes {
    pub title: Option<String>,
    pub description: Option<String>,
    pub year_launched: Option<i32>,
    pub opened: Option<bool>,
    pub rating: Option<Rating>,
    pub duration: Option<i32>,
    pub categories_id: Option<Vec<Uuid>>,
    pub genres_id: Option<Vec<Uuid>>,
    pub files: BTreeMap<VideoFile, FileValue>,
}

impl VideoAttributes {
    /// Copy every present scalar and file name onto `active`.
    ///
    /// Upload payloads are skipped; they must be extracted first.
    pub fn apply(&self, active: &mut video::ActiveModel) {
        if let Some(title) = &self.title {
            active.title = Set(title.clone());
        }
        if let Some(description) = &self.description {
            active.description = Set(description.clone());
        }
        if let Some(year) = self.year_launched {
            active.year_launched = Set(year);
        }
        if let Some(opened) = self.opened {
            active.opened = Set(opened);
        }
        if let Some(rating) = self.rating {
            active.rating = Set(rating);
        }
        if let Some(duration) = self.duration {
            active.duration = Set(duration);
        }
        for (field, value) in &self.files {
            if let Some(name) = value.filename() {
                field.set(active, Some(name.to_string()));
            }
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub year_launched: i32,
    pub opened: bool,
    pub rating: Rating,
    pub duration: i32,
    pub thumb_file: Option<String>,
    pub banner_file: Option<String>,
    pub trailer_file: Option<String>,
    pub video_file: Option<String>,
    pub thumb_file_url: Option<String>,
    pub banner_file_url: Option<String>,
    pub trailer_file_url: Option<String>,
    pub video_file_url: Option<String>,
    pub categories: Vec<CategoryResponse>,
    pub genres: Vec<GenreSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoListResponse {
    pub data: Vec<VideoResponse>,
    pub pagination: Pagination,
}

impl VideoResponse {
    /// `file_url` maps `(dir, filename)` to a public URL.
    pub fn new(
        m: video::Model,
        categories: Vec<CategoryResponse>,
        genres: Vec<GenreSummary>,
        file_url: impl Fn(&str, &str) -> String,
    ) -> Self {
        let dir = m.id.to_string();
        let url = |name: &Option<String>| name.as_deref().map(|n| file_url(&dir, n));
        Self {
            thumb_file_url: url(&m.thumb_file),
            banner_file_url: url(&m.banner_file),
            trailer_file_url: url(&m.trailer_file),
            video_file_url: url(&m.video_file),
            id: m.id,
            title: m.title,
            description: m.description,
            year_launched: m.year_launched,
            opened: m.opened,
            rating: m.rating,
            duration: m.duration,
            thumb_file: m.thumb_file,
            banner_file: m.banner_file,
            trailer_file: m.trailer_file,
            video_file: m.video_file,
            categories,
            genres,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        }
    }
}

/// Field-level checks for a video write.
///
/// With `required` set (create), absent required fields are errors. Relation
/// existence and the genre/category rule need the database and run later.
pub fn validate_video(
    payload: &VideoPayload,
    uploads: BTreeMap<VideoFile, UploadPayload>,
    required: bool,
    errors: &mut FieldErrors,
) -> VideoAttributes {
    let title = validate_name(errors, "title", payload.title.as_deref(), required);

    let description = match payload.description.as_deref().map(str::trim) {
        Some("") => {
            errors.add("description", "The description field is required.");
            None
        }
        None if required => {
            errors.add("description", "The description field is required.");
            None
        }
        other => other.map(str::to_string),
    };

    let year_launched = scalar(errors, "year_launched", payload.year_launched.as_ref(), required)
        .and_then(|v| match lenient_i64(v) {
            Some(year) if (1000..=9999).contains(&year) => Some(year as i32),
            _ => {
                errors.add("year_launched", "The year_launched does not match the format Y.");
                None
            }
        });

    let opened = payload.opened.as_ref().and_then(|v| {
        let parsed = lenient_bool(v);
        if parsed.is_none() {
            errors.add("opened", "The opened field must be true or false.");
        }
        parsed
    });

    let rating = match payload.rating.as_deref() {
        None => {
            if required {
                errors.add("rating", "The rating field is required.");
            }
            None
        }
        Some(raw) => match raw.trim().parse::<Rating>() {
            Ok(rating) => Some(rating),
            Err(_) => {
                errors.add("rating", "The selected rating is invalid.");
                None
            }
        },
    };

    let duration = scalar(errors, "duration", payload.duration.as_ref(), required).and_then(|v| {
        match lenient_i64(v) {
            Some(minutes) => match i32::try_from(minutes) {
                Ok(minutes) if minutes >= 1 => Some(minutes),
                Ok(_) => {
                    errors.add("duration", "The duration must be at least 1.");
                    None
                }
                Err(_) => {
                    errors.add(
                        "duration",
                        format!("The duration may not be greater than {}.", i32::MAX),
                    );
                    None
                }
            },
            None => {
                errors.add("duration", "The duration must be an integer.");
                None
            }
        }
    });

    let categories_id = parse_ids(errors, "categories_id", payload.categories_id.as_deref(), required);
    let genres_id = parse_ids(errors, "genres_id", payload.genres_id.as_deref(), required);

    let mut files = BTreeMap::new();
    for (field, upload) in uploads {
        if validate_upload(errors, field, &upload) {
            files.insert(field, FileValue::Upload(upload));
        }
    }

    VideoAttributes {
        title,
        description,
        year_launched,
        opened,
        rating,
        duration,
        categories_id,
        genres_id,
        files,
    }
}

fn scalar<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a Value>,
    required: bool,
) -> Option<&'a Value> {
    match value {
        None | Some(Value::Null) => {
            if required {
                errors.add(field, format!("The {field} field is required."));
            }
            None
        }
        Some(v) => Some(v),
    }
}

/// Effective content type of an upload: the declared one, else a guess from
/// the original filename.
pub fn upload_content_type(upload: &UploadPayload) -> String {
    match upload.content_type.as_deref() {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
        _ => mime_guess::from_path(&upload.original_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

fn validate_upload(errors: &mut FieldErrors, field: VideoFile, upload: &UploadPayload) -> bool {
    let name = field.name();
    let mut ok = true;
    if !field.accepts(&upload_content_type(upload)) {
        errors.add(name, field.type_message());
        ok = false;
    }
    if upload.size() > field.max_size() {
        errors.add(
            name,
            format!(
                "The {name} may not be greater than {} kilobytes.",
                field.max_size() / KIB
            ),
        );
        ok = false;
    }
    ok
}
