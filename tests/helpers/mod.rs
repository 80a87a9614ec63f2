//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;
use uuid::Uuid;

use cdnstore_core::config::{StorageConfig, VariantConfig};
use cdnstore_core::traits::StorageProvider;
use cdnstore_database::{MemoryAssetRepository, MemorySequenceRepository};
use cdnstore_service::{
    AssetService, LifecycleManager, SequenceAllocator, UploadRequest, UploadService,
};
use cdnstore_storage::{ImageVariantPipeline, LocalStorageProvider};

/// Counter alias used for upload group codes.
pub const GROUP_ALIAS: &str = "gallery_group";

/// Test application wired against in-memory repositories and a
/// temporary on-disk file store.
pub struct TestApp {
    /// Asset rows, for fault injection and direct inspection.
    pub asset_repo: MemoryAssetRepository,
    /// Sequence counters, for fault injection and direct inspection.
    pub sequence_repo: MemorySequenceRepository,
    pub allocator: Arc<SequenceAllocator>,
    pub assets: Arc<AssetService>,
    pub lifecycle: Arc<LifecycleManager>,
    pub upload: UploadService,
    /// Keeps the storage root alive for the test's duration.
    root: TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let storage: Arc<dyn StorageProvider> = Arc::new(
            LocalStorageProvider::new(root.path())
                .await
                .expect("Failed to init storage"),
        );

        let asset_repo = MemoryAssetRepository::new();
        let sequence_repo = MemorySequenceRepository::new();

        let allocator = Arc::new(SequenceAllocator::new(Arc::new(sequence_repo.clone())));
        let assets = Arc::new(AssetService::new(
            Arc::new(asset_repo.clone()),
            "https://cdn.test",
        ));
        let lifecycle = Arc::new(LifecycleManager::new(
            Arc::new(asset_repo.clone()),
            storage.clone(),
        ));
        let pipeline = Arc::new(
            ImageVariantPipeline::new(storage.clone(), &VariantConfig::default())
                .expect("Failed to init pipeline"),
        );
        let upload = UploadService::new(
            allocator.clone(),
            assets.clone(),
            lifecycle.clone(),
            storage,
            pipeline,
            StorageConfig::default(),
            GROUP_ALIAS,
        );

        Self {
            asset_repo,
            sequence_repo,
            allocator,
            assets,
            lifecycle,
            upload,
            root,
        }
    }

    /// Seed the group counter as of today
    pub async fn seed_counter(&self) {
        self.allocator
            .seed(GROUP_ALIAS, None, None)
            .await
            .expect("Failed to seed counter");
    }

    /// Absolute path of a stored file
    pub fn disk_path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Every regular file under the storage root, relative and sorted
    pub fn stored_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        collect_files(self.root.path(), self.root.path(), &mut files);
        files.sort();
        files
    }

    /// Upload a PNG of the given size
    pub async fn upload_png(
        &self,
        width: u32,
        height: u32,
        directory: Option<&str>,
        subject_id: Option<i64>,
    ) -> cdnstore_core::result::AppResult<cdnstore_entity::asset::AssetGroup> {
        self.upload
            .upload(UploadRequest {
                original_name: "photo.png".into(),
                mime_type: "image/png".into(),
                data: png(width, height),
                directory: directory.map(String::from),
                owner_id: Uuid::nil(),
                subject_kind: None,
                subject_id,
                description: "integration".into(),
                is_private: false,
            })
            .await
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}

/// Encode a solid-colour PNG
pub fn png(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 80, 20]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    Bytes::from(buf)
}

/// Whether a code has the `ER-NNNNN` fallback shape
pub fn is_fallback(code: &str) -> bool {
    code.len() == 8 && code.starts_with("ER-") && code[3..].bytes().all(|b| b.is_ascii_digit())
}

/// Connect to the database named by `DATABASE_URL` and apply migrations.
///
/// Returns `None` when the variable is unset so the PostgreSQL tests skip.
/// Connection or migration errors still panic.
pub async fn postgres_or_skip() -> Option<cdnstore_database::DatabasePool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("Skipping PostgreSQL test (DATABASE_URL not set)");
        return None;
    };
    let config = cdnstore_core::config::DatabaseConfig {
        url,
        max_connections: 10,
        min_connections: 1,
        acquire_timeout_seconds: 10,
        max_lifetime_seconds: 300,
    };
    let pool = cdnstore_database::DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    cdnstore_database::migration::run_migrations(pool.pool())
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// A key no other test run will use.
pub fn unique_key(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7().simple())
}
