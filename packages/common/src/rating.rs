#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Age rating of a video.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")
)]
pub enum Rating {
    /// General audiences ("livre").
    #[serde(rename = "L")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "L"))]
    General,
    #[serde(rename = "10")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "10"))]
    Age10,
    #[serde(rename = "12")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "12"))]
    Age12,
    #[serde(rename = "14")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "14"))]
    Age14,
    #[serde(rename = "16")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "16"))]
    Age16,
    #[serde(rename = "18")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "18"))]
    Age18,
}

impl Rating {
    /// All ratings, in ascending order of restriction.
    pub const ALL: &'static [Rating] = &[
        Self::General,
        Self::Age10,
        Self::Age12,
        Self::Age14,
        Self::Age16,
        Self::Age18,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "L",
            Self::Age10 => "10",
            Self::Age12 => "12",
            Self::Age14 => "14",
            Self::Age16 => "16",
            Self::Age18 => "18",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid rating string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRatingError {
    invalid: String,
}

impl fmt::Display for ParseRatingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid rating '{}'. Valid values: {}",
            self.invalid,
            Rating::ALL
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseRatingError {}

impl FromStr for Rating {
    type Err = ParseRatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rating::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseRatingError {
                invalid: s.to_string(),
            })
    }
}
