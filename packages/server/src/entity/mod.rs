pub mod cast_member;
pub mod category;
pub mod category_genre;
pub mod category_video;
pub mod genre;
pub mod genre_video;
pub mod video;
