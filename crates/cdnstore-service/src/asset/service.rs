//! Asset queries and record creation.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use cdnstore_core::error::AppError;
use cdnstore_core::result::AppResult;
use cdnstore_core::types::{PageRequest, PageResponse, SoftDeleteScope};
use cdnstore_database::repositories::AssetRepository;
use cdnstore_entity::asset::{Asset, AssetFilter, AssetGroup, NewAsset, SizeLabel, UpdateAsset};

/// Reads assets and writes new asset records.
#[derive(Debug, Clone)]
pub struct AssetService {
    /// Asset repository.
    repo: Arc<dyn AssetRepository>,
    /// Base URL files are served from.
    public_url: String,
}

impl AssetService {
    /// Creates a new asset service.
    pub fn new(repo: Arc<dyn AssetRepository>, public_url: impl Into<String>) -> Self {
        Self {
            repo,
            public_url: public_url.into(),
        }
    }

    /// Lists assets one page at a time.
    pub async fn list(
        &self,
        page: &PageRequest,
        filter: &AssetFilter,
    ) -> AppResult<PageResponse<Asset>> {
        self.repo.find_paginated(page, filter).await
    }

    /// Counts assets matching a filter.
    pub async fn count(&self, filter: &AssetFilter) -> AppResult<u64> {
        self.repo.count(filter).await
    }

    /// Gets an asset by ID under the given scope.
    pub async fn get(&self, id: Uuid, scope: SoftDeleteScope) -> AppResult<Asset> {
        self.repo
            .find_by_id(id, scope)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))
    }

    /// Gets the rows of a group, optionally narrowed to one size label.
    pub async fn group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
        scope: SoftDeleteScope,
    ) -> AppResult<AssetGroup> {
        let assets = self
            .repo
            .find_by_group_code(group_code, size_label, scope)
            .await?;
        if assets.is_empty() {
            return Err(AppError::not_found(format!(
                "Asset group '{group_code}' not found"
            )));
        }
        Ok(AssetGroup::new(group_code, assets))
    }

    /// Records the original upload of a group.
    pub async fn create_original(&self, data: &NewAsset) -> AppResult<Asset> {
        if !data.size_label.is_original() {
            return Err(AppError::validation(format!(
                "Expected an original, got size label '{}'",
                data.size_label
            )));
        }
        let asset = self.repo.create(data).await?;
        info!(
            asset_id = %asset.id,
            group_code = %asset.group_code,
            path = %asset.file_path,
            "Created original asset"
        );
        Ok(asset)
    }

    /// Records the variants of a group in one all-or-nothing batch.
    pub async fn create_variants(&self, data: &[NewAsset]) -> AppResult<Vec<Asset>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(original) = data.iter().find(|d| d.size_label.is_original()) {
            return Err(AppError::validation(format!(
                "Variant batch for group '{}' contains an original",
                original.group_code
            )));
        }
        let group_code = &data[0].group_code;
        if data.iter().any(|d| &d.group_code != group_code) {
            return Err(AppError::validation(
                "Variant batch spans more than one group",
            ));
        }

        let created = self.repo.create_many(data).await?;
        info!(group_code = %group_code, count = created.len(), "Created variant assets");
        Ok(created)
    }

    /// Updates the description and/or privacy flag of an active asset.
    pub async fn update_details(&self, id: Uuid, update: &UpdateAsset) -> AppResult<Asset> {
        if update.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }
        let asset = self
            .repo
            .update_details(id, update)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))?;
        info!(asset_id = %id, "Updated asset details");
        Ok(asset)
    }

    /// Public URL of an asset's file.
    pub fn url(&self, asset: &Asset) -> String {
        asset.url(&self.public_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdnstore_core::error::ErrorKind;
    use cdnstore_database::MemoryAssetRepository;

    fn new_asset(group_code: &str, label: &str) -> NewAsset {
        NewAsset {
            group_code: group_code.to_string(),
            size_label: label.parse().unwrap(),
            file_name: format!("a_{label}.png"),
            file_path: format!("images/gallery/a_{label}.png"),
            file_size_bytes: 10,
            owner_id: Uuid::nil(),
            subject: None,
            is_private: false,
            description: String::new(),
            has_optimized: label == SizeLabel::ORIGINAL,
        }
    }

    fn service() -> AssetService {
        AssetService::new(Arc::new(MemoryAssetRepository::new()), "https://cdn.test")
    }

    #[tokio::test]
    async fn test_create_original_requires_original_label() {
        let svc = service();
        let err = svc.create_original(&new_asset("G1", "small")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let original = svc.create_original(&new_asset("G1", "original")).await.unwrap();
        assert_eq!(svc.url(&original), "https://cdn.test/images/gallery/a_original.png");
    }

    #[tokio::test]
    async fn test_create_variants_rejects_mixed_batches() {
        let svc = service();
        let err = svc
            .create_variants(&[new_asset("G1", "small"), new_asset("G2", "large")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = svc
            .create_variants(&[new_asset("G1", "small"), new_asset("G1", "original")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_group_lookup() {
        let svc = service();
        svc.create_original(&new_asset("G1", "original")).await.unwrap();
        svc.create_variants(&[new_asset("G1", "small"), new_asset("G1", "large")])
            .await
            .unwrap();

        let group = svc.group("G1", None, SoftDeleteScope::Active).await.unwrap();
        assert_eq!(group.len(), 3);
        assert!(group.original().is_some());

        let small: SizeLabel = "small".parse().unwrap();
        let narrowed = svc.group("G1", Some(&small), SoftDeleteScope::Active).await.unwrap();
        assert_eq!(narrowed.len(), 1);

        assert!(svc.group("G9", None, SoftDeleteScope::Active).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_details() {
        let svc = service();
        let asset = svc.create_original(&new_asset("G1", "original")).await.unwrap();

        let updated = svc
            .update_details(
                asset.id,
                &UpdateAsset {
                    description: Some("Front view".into()),
                    is_private: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "Front view");
        assert!(updated.is_private);

        let err = svc.update_details(asset.id, &UpdateAsset::default()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
