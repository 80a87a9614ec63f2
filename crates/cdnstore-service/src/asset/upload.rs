//! Upload orchestration: store the original, allocate a group code, derive
//! variants and record the whole group.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use cdnstore_core::config::StorageConfig;
use cdnstore_core::error::AppError;
use cdnstore_core::result::AppResult;
use cdnstore_core::traits::StorageProvider;
use cdnstore_entity::asset::{AssetGroup, NewAsset, SizeLabel, SubjectRef};
use cdnstore_storage::paths;
use cdnstore_storage::variant::VariantPipeline;

use super::lifecycle::LifecycleManager;
use super::service::AssetService;
use crate::sequence::SequenceAllocator;

/// One uploaded image with its metadata.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name of the file on the client. Only its extension is used.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File content.
    pub data: Bytes,
    /// Target directory under `images/`; the configured default when `None`.
    pub directory: Option<String>,
    /// The uploading user.
    pub owner_id: Uuid,
    /// Subject kind, as given by the client.
    pub subject_kind: Option<String>,
    /// Subject id, as given by the client.
    pub subject_id: Option<i64>,
    /// Free-form description.
    pub description: String,
    /// Privacy flag.
    pub is_private: bool,
}

/// Handles image uploads end to end.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Group code allocator.
    allocator: Arc<SequenceAllocator>,
    /// Asset record creation.
    assets: Arc<AssetService>,
    /// Compensation when a later step fails.
    lifecycle: Arc<LifecycleManager>,
    /// Physical file store.
    storage: Arc<dyn StorageProvider>,
    /// Variant pipeline.
    pipeline: Arc<dyn VariantPipeline>,
    /// Storage configuration.
    config: StorageConfig,
    /// Counter alias group codes are drawn from.
    group_alias: String,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        allocator: Arc<SequenceAllocator>,
        assets: Arc<AssetService>,
        lifecycle: Arc<LifecycleManager>,
        storage: Arc<dyn StorageProvider>,
        pipeline: Arc<dyn VariantPipeline>,
        config: StorageConfig,
        group_alias: impl Into<String>,
    ) -> Self {
        Self {
            allocator,
            assets,
            lifecycle,
            storage,
            pipeline,
            config,
            group_alias: group_alias.into(),
        }
    }

    fn validate(&self, request: &UploadRequest) -> AppResult<()> {
        if request.data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if request.data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        if !self.config.is_allowed_mime(&request.mime_type) {
            return Err(AppError::validation(format!(
                "File type '{}' is not allowed",
                request.mime_type
            )));
        }
        Ok(())
    }

    /// Stores an upload and its variants, returning the recorded group.
    ///
    /// If anything fails after the original row was recorded, the original
    /// and any written variant files are purged before the error is
    /// returned.
    pub async fn upload(&self, request: UploadRequest) -> AppResult<AssetGroup> {
        self.validate(&request)?;

        let directory = paths::validate_directory(
            request
                .directory
                .as_deref()
                .unwrap_or(&self.config.default_directory),
        )?
        .to_string();
        let subject = SubjectRef::from_input(
            request.subject_kind.as_deref(),
            request.subject_id,
            &directory,
        )?;

        let extension = match paths::extension_for_mime(&request.mime_type) {
            Some(ext) => ext.to_string(),
            None => paths::split_extension(&request.original_name)
                .1
                .to_ascii_lowercase(),
        };
        let file_name = format!("{}{extension}", Uuid::now_v7());
        let file_path = paths::image_path(&directory, &file_name);
        let file_size_bytes = request.data.len() as i64;

        self.storage.write(&file_path, request.data).await?;

        let group_code = match self.allocator.allocate_group_code(&self.group_alias).await {
            Ok(code) => code,
            Err(e) => {
                self.discard_file(&file_path).await;
                return Err(e);
            }
        };

        let template = NewAsset {
            group_code: group_code.clone(),
            size_label: SizeLabel::original(),
            file_name: file_name.clone(),
            file_path: file_path.clone(),
            file_size_bytes,
            owner_id: request.owner_id,
            subject,
            is_private: request.is_private,
            description: request.description,
            has_optimized: true,
        };

        let original = match self.assets.create_original(&template).await {
            Ok(original) => original,
            Err(e) => {
                self.discard_file(&file_path).await;
                return Err(e);
            }
        };

        let output_dir = paths::image_dir(&directory);
        let processed = match self
            .pipeline
            .process(&file_path, &output_dir, &file_name)
            .await
        {
            Ok(processed) => processed,
            Err(e) => {
                self.abandon(original.id, &[]).await;
                return Err(e);
            }
        };

        let variants: Vec<NewAsset> = processed
            .iter()
            .map(|v| NewAsset {
                size_label: v.size_label.clone(),
                file_name: v.file_name.clone(),
                file_path: paths::join(&output_dir, &v.file_name),
                file_size_bytes: v.file_size_bytes,
                has_optimized: false,
                ..template.clone()
            })
            .collect();

        let created = match self.assets.create_variants(&variants).await {
            Ok(created) => created,
            Err(e) => {
                let written: Vec<String> = variants.into_iter().map(|v| v.file_path).collect();
                self.abandon(original.id, &written).await;
                return Err(e);
            }
        };

        let mut members = Vec::with_capacity(created.len() + 1);
        members.push(original);
        members.extend(created);
        let group = AssetGroup::verified(group_code, members)?;

        info!(
            group_code = %group.code,
            path = %file_path,
            variants = group.len() - 1,
            "Upload completed"
        );
        Ok(group)
    }

    /// Purge a recorded original and remove stray variant files.
    async fn abandon(&self, original_id: Uuid, variant_paths: &[String]) {
        if let Err(e) = self.lifecycle.force_delete(original_id).await {
            warn!(asset_id = %original_id, error = %e, "Failed to purge abandoned original");
        }
        for path in variant_paths {
            self.discard_file(path).await;
        }
    }

    async fn discard_file(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path, error = %e, "Failed to remove file of abandoned upload");
        }
    }
}
