use super::error::StorageError;

const MAX_PATH_LEN: usize = 512;

/// Join an owner directory and a filename into a blob path (`{dir}/{filename}`).
pub fn blob_path(dir: &str, filename: &str) -> String {
    format!("{dir}/{filename}")
}

/// Validates a relative blob path such as `0191c7.../3f2a.mp4`.
///
/// Paths are used as keys by every store and as relative filesystem paths by
/// [`FilesystemBlobStore`](super::filesystem::FilesystemBlobStore), so anything
/// that could escape the store root is rejected.
pub fn validate_blob_path(path: &str) -> Result<&str, StorageError> {
    let invalid = |reason: &str| Err(StorageError::InvalidPath(format!("{reason}: {path:?}")));

    if path.is_empty() {
        return invalid("path cannot be empty");
    }
    if path.len() > MAX_PATH_LEN {
        return invalid("path exceeds maximum length of 512 characters");
    }
    if path.contains('\0') {
        return invalid("path must not contain null bytes");
    }
    if path.contains('\\') {
        return invalid("path must not contain backslashes");
    }
    if path.starts_with('/') {
        return invalid("path must not start with '/'");
    }

    for segment in path.split('/') {
        if segment.is_empty() {
            return invalid("path must not contain empty segments");
        }
        if segment == ".." {
            return invalid("path must not contain '..' traversal");
        }
        if segment.starts_with('.') {
            return invalid("path segments must not start with '.'");
        }
    }

    if !path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
    {
        return invalid("path contains invalid characters (allowed: a-zA-Z0-9, /, -, _, .)");
    }

    Ok(path)
}
