pub mod cast_member_type;
pub mod rating;
pub mod storage;

pub use cast_member_type::CastMemberType;
pub use rating::Rating;
