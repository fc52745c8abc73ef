mod error;
mod path;
mod traits;

pub mod filesystem;
pub mod memory;

pub use error::StorageError;
pub use path::{blob_path, validate_blob_path};
pub use traits::{BlobStore, BoxReader};
