pub mod json;
pub mod video_form;
