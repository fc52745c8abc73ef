pub mod genre;
pub mod relation_sync;
pub mod uploads;
pub mod video;
pub mod write;
