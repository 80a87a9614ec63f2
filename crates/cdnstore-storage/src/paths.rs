//! Storage path conventions.
//!
//! Every stored image lives at `images/{directory}/{file_name}` relative to
//! the storage root.

use cdnstore_core::error::AppError;
use cdnstore_core::result::AppResult;

/// Top-level directory holding every image.
pub const IMAGE_ROOT: &str = "images";

/// Check that a directory name is a single safe path segment.
pub fn validate_directory(directory: &str) -> AppResult<&str> {
    let trimmed = directory.trim_matches('/');
    let valid = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(trimmed)
    } else {
        Err(AppError::validation(format!(
            "Invalid directory name '{directory}'"
        )))
    }
}

/// `images/{directory}`.
pub fn image_dir(directory: &str) -> String {
    format!("{IMAGE_ROOT}/{}", directory.trim_matches('/'))
}

/// `images/{directory}/{file_name}`.
pub fn image_path(directory: &str, file_name: &str) -> String {
    join(&image_dir(directory), file_name)
}

/// Join a directory path and a file name with a single `/`.
pub fn join(dir: &str, file_name: &str) -> String {
    if dir.is_empty() {
        return file_name.to_string();
    }
    format!("{}/{}", dir.trim_end_matches('/'), file_name)
}

/// Split a file name into stem and extension (including the dot).
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => file_name.split_at(pos),
        _ => (file_name, ""),
    }
}

/// `{stem}_{label}{.ext}`.
pub fn variant_file_name(file_name: &str, label: &str) -> String {
    let (stem, ext) = split_extension(file_name);
    format!("{stem}_{label}{ext}")
}

/// File extension (with dot) for an accepted image MIME type.
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/jpeg" | "image/jpg" => Some(".jpg"),
        "image/png" => Some(".png"),
        "image/gif" => Some(".gif"),
        "image/webp" => Some(".webp"),
        _ => None,
    }
}
