use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a cast member. Serialized as its numeric code (1 = director, 2 = actor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "i32", db_type = "Integer")
)]
#[serde(try_from = "i32", into = "i32")]
pub enum CastMemberType {
    #[cfg_attr(feature = "sea-orm", sea_orm(num_value = 1))]
    Director,
    #[cfg_attr(feature = "sea-orm", sea_orm(num_value = 2))]
    Actor,
}

impl CastMemberType {
    pub const ALL: &'static [CastMemberType] = &[Self::Director, Self::Actor];

    pub fn code(&self) -> i32 {
        match self {
            Self::Director => 1,
            Self::Actor => 2,
        }
    }
}

impl From<CastMemberType> for i32 {
    fn from(value: CastMemberType) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for CastMemberType {
    type Error = InvalidCastMemberType;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        CastMemberType::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or(InvalidCastMemberType(code))
    }
}

/// Error for a numeric code outside the known cast member types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCastMemberType(pub i32);

impl fmt::Display for InvalidCastMemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid cast member type {}. Valid values: 1, 2", self.0)
    }
}

impl std::error::Error for InvalidCastMemberType {}
