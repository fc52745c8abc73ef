mod category;
mod common;
mod files;
mod openapi;
mod video;
mod write_path;
