//! Asset lifecycle transitions: soft delete, restore and purge.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

use cdnstore_core::error::AppError;
use cdnstore_core::result::AppResult;
use cdnstore_core::traits::StorageProvider;
use cdnstore_core::types::SoftDeleteScope;
use cdnstore_database::repositories::AssetRepository;
use cdnstore_entity::asset::{Asset, LifecycleAction, SizeLabel};

/// Drives assets through `Active -> SoftDeleted -> Purged`.
///
/// Purging removes the row first and only then asks the storage provider
/// to remove the file. A failed file removal is logged and leaves the
/// purge in place.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    /// Asset repository.
    repo: Arc<dyn AssetRepository>,
    /// Physical file store.
    storage: Arc<dyn StorageProvider>,
}

impl LifecycleManager {
    /// Creates a new lifecycle manager.
    pub fn new(repo: Arc<dyn AssetRepository>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { repo, storage }
    }

    async fn find(&self, id: Uuid, scope: SoftDeleteScope) -> AppResult<Asset> {
        self.repo
            .find_by_id(id, scope)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))
    }

    /// Soft-deletes an active asset. An already deleted asset is not found.
    pub async fn delete(&self, id: Uuid) -> AppResult<Asset> {
        let asset = self.find(id, SoftDeleteScope::Active).await?;
        asset.state().apply(LifecycleAction::Delete)?;

        let deleted = self
            .repo
            .soft_delete(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))?;
        info!(asset_id = %id, group_code = %deleted.group_code, "Soft-deleted asset");
        Ok(deleted)
    }

    /// Restores a soft-deleted asset.
    pub async fn restore(&self, id: Uuid) -> AppResult<Asset> {
        let asset = self.find(id, SoftDeleteScope::WithDeleted).await?;
        asset.state().apply(LifecycleAction::Restore)?;

        let restored = self.repo.restore(id).await?.ok_or_else(|| {
            AppError::conflict(format!("Asset {id} was restored concurrently"))
        })?;
        info!(asset_id = %id, group_code = %restored.group_code, "Restored asset");
        Ok(restored)
    }

    /// Permanently removes an asset row, then its file.
    pub async fn force_delete(&self, id: Uuid) -> AppResult<Asset> {
        let asset = self.find(id, SoftDeleteScope::WithDeleted).await?;
        asset.state().apply(LifecycleAction::Purge)?;

        let purged = self
            .repo
            .force_delete(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))?;
        info!(asset_id = %id, group_code = %purged.group_code, "Purged asset");

        self.remove_file(&purged).await;
        Ok(purged)
    }

    /// Soft-deletes every active asset of a group.
    pub async fn delete_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>> {
        let deleted = self.repo.soft_delete_group(group_code, size_label).await?;
        ensure_matched(group_code, size_label, &deleted, "active")?;
        info!(group_code, count = deleted.len(), "Soft-deleted asset group");
        Ok(deleted)
    }

    /// Restores every soft-deleted asset of a group.
    pub async fn restore_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>> {
        let restored = self.repo.restore_group(group_code, size_label).await?;
        ensure_matched(group_code, size_label, &restored, "deleted")?;
        info!(group_code, count = restored.len(), "Restored asset group");
        Ok(restored)
    }

    /// Permanently removes every asset of a group, then one file per row.
    pub async fn force_delete_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>> {
        let purged = self.repo.force_delete_group(group_code, size_label).await?;
        ensure_matched(group_code, size_label, &purged, "")?;
        info!(group_code, count = purged.len(), "Purged asset group");

        join_all(purged.iter().map(|asset| self.remove_file(asset))).await;
        Ok(purged)
    }

    /// Best-effort removal of a purged asset's file.
    async fn remove_file(&self, asset: &Asset) {
        if let Err(e) = self.storage.delete(&asset.file_path).await {
            warn!(
                asset_id = %asset.id,
                path = %asset.file_path,
                error = %e,
                "Failed to remove file of purged asset; file is orphaned"
            );
        }
    }
}

fn ensure_matched(
    group_code: &str,
    size_label: Option<&SizeLabel>,
    affected: &[Asset],
    state: &str,
) -> AppResult<()> {
    if !affected.is_empty() {
        return Ok(());
    }
    let label = size_label.map(|l| format!(" '{l}'")).unwrap_or_default();
    let state = if state.is_empty() {
        String::new()
    } else {
        format!(" {state}")
    };
    Err(AppError::not_found(format!(
        "No{state}{label} assets in group '{group_code}'"
    )))
}
