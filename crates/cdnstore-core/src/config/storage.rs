//! Storage and upload configuration.

use serde::{Deserialize, Serialize};

/// File storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory that stored paths (`images/{dir}/{file}`) are relative to.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Public base URL that stored paths are appended to.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Directory used when an upload does not name one.
    #[serde(default = "default_directory")]
    pub default_directory: String,
    /// Maximum upload size in bytes (default 10 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// MIME types accepted for upload.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            public_url: default_public_url(),
            default_directory: default_directory(),
            max_upload_size_bytes: default_max_upload(),
            allowed_mime_types: default_allowed_mime_types(),
        }
    }
}

impl StorageConfig {
    /// Check whether a MIME type may be uploaded.
    pub fn is_allowed_mime(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|m| m == mime_type)
    }
}

fn default_root_path() -> String {
    "./public".to_string()
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_directory() -> String {
    "gallery".to_string()
}

fn default_max_upload() -> u64 {
    10 * 1024 * 1024 // 10 MB
}

fn default_allowed_mime_types() -> Vec<String> {
    ["image/jpeg", "image/png", "image/gif", "image/webp"]
        .into_iter()
        .map(String::from)
        .collect()
}
