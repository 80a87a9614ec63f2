//! In-memory storage provider.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use cdnstore_core::error::AppError;
use cdnstore_core::result::AppResult;
use cdnstore_core::traits::StorageProvider;

#[derive(Debug, Default)]
struct InnerState {
    files: BTreeMap<String, Bytes>,
    /// Every path passed to `delete`, in call order.
    delete_calls: Vec<String>,
    /// Paths whose deletion fails.
    failing_deletes: HashSet<String>,
    /// Writes to any path containing one of these fragments fail.
    failing_writes: Vec<String>,
}

/// Storage provider keeping files in process memory.
///
/// Records every delete request so callers can assert on physical cleanup.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageProvider {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deleting `path` fail until cleared.
    pub async fn fail_delete_of(&self, path: impl Into<String>) {
        self.state.lock().await.failing_deletes.insert(path.into());
    }

    /// Make writes fail for every path containing `fragment`.
    pub async fn fail_writes_containing(&self, fragment: impl Into<String>) {
        self.state.lock().await.failing_writes.push(fragment.into());
    }

    /// Paths passed to `delete` so far, in call order.
    pub async fn delete_calls(&self) -> Vec<String> {
        self.state.lock().await.delete_calls.clone()
    }

    /// Paths of every stored file.
    pub async fn paths(&self) -> Vec<String> {
        self.state.lock().await.files.keys().cloned().collect()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.state
            .lock()
            .await
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("File not found: {path}")))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.failing_writes.iter().any(|f| path.contains(f.as_str())) {
            return Err(AppError::storage(format!("Failed to write file: {path}")));
        }
        debug!(path, bytes = data.len(), "Wrote file");
        state.files.insert(path.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.delete_calls.push(path.to_string());
        if state.failing_deletes.contains(path) {
            return Err(AppError::storage(format!("Failed to delete file: {path}")));
        }
        state.files.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.state.lock().await.files.contains_key(path))
    }

    async fn create_dir(&self, _path: &str) -> AppResult<()> {
        Ok(())
    }
}
