use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::FieldErrors;

pub const DEFAULT_PER_PAGE: u64 = 15;
pub const MAX_NAME_LEN: usize = 255;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 15)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 4)]
    pub total_pages: u64,
}

/// Query parameters accepted by every list endpoint.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page number (1-based). Defaults to 1.
    pub page: Option<u64>,
    /// Items per page, clamped to 1..=100. Defaults to 15.
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on the name or title.
    pub search: Option<String>,
    /// Column to sort by. Defaults to `created_at`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

impl ListQuery {
    /// Effective `(page, per_page)`.
    pub fn page_and_size(&self) -> (u64, u64) {
        let page = Ord::max(self.page.unwrap_or(1), 1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, 100);
        (page, per_page)
    }

    pub fn ascending(&self) -> bool {
        self.sort_order.as_deref() == Some("asc")
    }

    /// Trimmed, LIKE-escaped, lowercased search term, if any.
    pub fn search_pattern(&self) -> Option<String> {
        let term = escape_like(self.search.as_deref()?.trim());
        if term.is_empty() {
            None
        } else {
            Some(format!("%{}%", term.to_lowercase()))
        }
    }
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Serde helper for ID list fields.
///
/// Accepts a JSON array or a single comma-separated string, so the same field
/// works for JSON bodies and form submissions. Entries stay raw strings until
/// [`parse_ids`] checks them.
pub fn id_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().flat_map(|v| split_ids(&v)).collect(),
        other => split_ids(&other),
    };
    Ok(Some(ids))
}

/// Split one raw ID value on commas, dropping blanks.
pub fn split_ids(value: &Value) -> Vec<String> {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate a required-on-create name field and return its trimmed value.
pub fn validate_name(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    required: bool,
) -> Option<String> {
    match value.map(str::trim) {
        None if required => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
        None => None,
        Some("") => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
        Some(name) if name.chars().count() > MAX_NAME_LEN => {
            errors.add(
                field,
                format!("The {field} may not be greater than {MAX_NAME_LEN} characters."),
            );
            None
        }
        Some(name) => Some(name.to_string()),
    }
}

/// Parse a list of raw IDs, deduplicated in first-seen order.
///
/// A present but empty list counts as missing.
pub fn parse_ids(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<&[String]>,
    required: bool,
) -> Option<Vec<Uuid>> {
    let Some(raw) = raw else {
        if required {
            errors.add(field, format!("The {field} field is required."));
        }
        return None;
    };
    if raw.is_empty() {
        errors.add(field, format!("The {field} field is required."));
        return None;
    }

    let mut ids = Vec::with_capacity(raw.len());
    for item in raw {
        match Uuid::parse_str(item) {
            Ok(id) if !ids.contains(&id) => ids.push(id),
            Ok(_) => {}
            Err(_) => {
                errors.add(field, format!("The selected {field} is invalid."));
                return None;
            }
        }
    }
    Some(ids)
}

/// Read an integer from a JSON number or a numeric string.
pub fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a boolean from `true`/`false`, `1`/`0`, or their string forms.
pub fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "true" | "1" | "on" => Some(true),
            "false" | "0" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
