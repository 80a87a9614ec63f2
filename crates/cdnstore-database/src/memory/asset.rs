//! In-memory asset repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use cdnstore_core::error::AppError;
use cdnstore_core::result::AppResult;
use cdnstore_core::types::{PageRequest, PageResponse, SoftDeleteScope};
use cdnstore_entity::asset::{Asset, AssetFilter, NewAsset, SizeLabel, UpdateAsset};

use super::unavailable;
use crate::repositories::AssetRepository;

/// Internal state for the memory asset repository.
#[derive(Debug, Default)]
struct InnerState {
    /// Rows in insertion order.
    rows: Vec<Asset>,
    /// When set, every batch fails at this row index.
    fail_batch_row: Option<usize>,
    /// When true, every operation fails.
    offline: bool,
}

impl InnerState {
    fn check_online(&self, operation: &str) -> AppResult<()> {
        if self.offline {
            Err(unavailable(operation))
        } else {
            Ok(())
        }
    }

    fn has_label(&self, group_code: &str, label: &SizeLabel) -> bool {
        self.rows
            .iter()
            .any(|a| a.group_code == group_code && &a.size_label == label)
    }

    fn in_group<'a>(
        &'a mut self,
        group_code: &'a str,
        size_label: Option<&'a SizeLabel>,
    ) -> impl Iterator<Item = &'a mut Asset> + 'a {
        self.rows.iter_mut().filter(move |a| {
            a.group_code == group_code && size_label.is_none_or(|l| &a.size_label == l)
        })
    }
}

/// Build the stored row for an insert.
fn materialize(data: &NewAsset) -> Asset {
    let now = Utc::now();
    Asset {
        id: Uuid::now_v7(),
        group_code: data.group_code.clone(),
        size_label: data.size_label.clone(),
        file_name: data.file_name.clone(),
        file_path: data.file_path.clone(),
        file_size_bytes: data.file_size_bytes,
        owner_id: data.owner_id,
        subject_kind: data.subject_kind(),
        subject_id: data.subject_id(),
        is_private: data.is_private,
        description: data.description.clone(),
        has_optimized: data.has_optimized,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

fn duplicate(data: &NewAsset) -> AppError {
    AppError::conflict(format!(
        "Group '{}' already has a '{}' asset",
        data.group_code, data.size_label
    ))
}

/// Asset repository holding rows in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetRepository {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
}

impl MemoryAssetRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent batch insert fail at `row` (zero-based).
    /// `None` clears the switch.
    pub async fn fail_batch_at(&self, row: Option<usize>) {
        self.state.lock().await.fail_batch_row = row;
    }

    /// Switch the repository offline so every operation fails.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Every stored row, deleted or not, in insertion order.
    pub async fn snapshot(&self) -> Vec<Asset> {
        self.state.lock().await.rows.clone()
    }
}

#[async_trait]
impl AssetRepository for MemoryAssetRepository {
    async fn find_paginated(
        &self,
        page: &PageRequest,
        filter: &AssetFilter,
    ) -> AppResult<PageResponse<Asset>> {
        let state = self.state.lock().await;
        state.check_online("Failed to list assets")?;

        let matching: Vec<&Asset> = state.rows.iter().rev().filter(|a| filter.matches(a)).collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Ok(PageResponse::new(items, page.page, page.per_page, total))
    }

    async fn count(&self, filter: &AssetFilter) -> AppResult<u64> {
        let state = self.state.lock().await;
        state.check_online("Failed to count assets")?;
        Ok(state.rows.iter().filter(|a| filter.matches(a)).count() as u64)
    }

    async fn find_by_id(&self, id: Uuid, scope: SoftDeleteScope) -> AppResult<Option<Asset>> {
        let state = self.state.lock().await;
        state.check_online("Failed to find asset")?;
        Ok(state
            .rows
            .iter()
            .find(|a| a.id == id && scope.admits(a.is_deleted()))
            .cloned())
    }

    async fn find_by_group_code(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
        scope: SoftDeleteScope,
    ) -> AppResult<Vec<Asset>> {
        let state = self.state.lock().await;
        state.check_online("Failed to find asset group")?;
        Ok(state
            .rows
            .iter()
            .filter(|a| {
                a.group_code == group_code
                    && size_label.is_none_or(|l| &a.size_label == l)
                    && scope.admits(a.is_deleted())
            })
            .cloned()
            .collect())
    }

    async fn create(&self, data: &NewAsset) -> AppResult<Asset> {
        data.validate()?;
        let mut state = self.state.lock().await;
        state.check_online("Failed to create asset")?;

        if state.has_label(&data.group_code, &data.size_label) {
            return Err(duplicate(data));
        }
        let asset = materialize(data);
        state.rows.push(asset.clone());
        Ok(asset)
    }

    async fn create_many(&self, data: &[NewAsset]) -> AppResult<Vec<Asset>> {
        for item in data {
            item.validate()?;
        }

        let mut state = self.state.lock().await;
        state.check_online("Failed to create asset batch")?;

        // Stage the batch and only publish it once every row is accepted.
        let mut staged: Vec<Asset> = Vec::with_capacity(data.len());
        for (index, item) in data.iter().enumerate() {
            if state.fail_batch_row == Some(index) {
                return Err(AppError::database(format!(
                    "Failed to create asset: injected failure at batch row {index}"
                )));
            }
            let clashes = state.has_label(&item.group_code, &item.size_label)
                || staged
                    .iter()
                    .any(|a| a.group_code == item.group_code && a.size_label == item.size_label);
            if clashes {
                return Err(duplicate(item));
            }
            staged.push(materialize(item));
        }

        state.rows.extend(staged.iter().cloned());
        Ok(staged)
    }

    async fn update_details(&self, id: Uuid, update: &UpdateAsset) -> AppResult<Option<Asset>> {
        let mut state = self.state.lock().await;
        state.check_online("Failed to update asset")?;

        let Some(asset) = state
            .rows
            .iter_mut()
            .find(|a| a.id == id && !a.is_deleted())
        else {
            return Ok(None);
        };
        if let Some(description) = &update.description {
            asset.description = description.clone();
        }
        if let Some(is_private) = update.is_private {
            asset.is_private = is_private;
        }
        asset.updated_at = Utc::now();
        Ok(Some(asset.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<Option<Asset>> {
        let mut state = self.state.lock().await;
        state.check_online("Failed to delete asset")?;

        let now = Utc::now();
        Ok(state
            .rows
            .iter_mut()
            .find(|a| a.id == id && !a.is_deleted())
            .map(|a| {
                a.deleted_at = Some(now);
                a.updated_at = now;
                a.clone()
            }))
    }

    async fn restore(&self, id: Uuid) -> AppResult<Option<Asset>> {
        let mut state = self.state.lock().await;
        state.check_online("Failed to restore asset")?;

        Ok(state
            .rows
            .iter_mut()
            .find(|a| a.id == id && a.is_deleted())
            .map(|a| {
                a.deleted_at = None;
                a.updated_at = Utc::now();
                a.clone()
            }))
    }

    async fn force_delete(&self, id: Uuid) -> AppResult<Option<Asset>> {
        let mut state = self.state.lock().await;
        state.check_online("Failed to purge asset")?;

        Ok(state
            .rows
            .iter()
            .position(|a| a.id == id)
            .map(|index| state.rows.remove(index)))
    }

    async fn soft_delete_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>> {
        let mut state = self.state.lock().await;
        state.check_online("Failed to delete asset group")?;

        let now = Utc::now();
        Ok(state
            .in_group(group_code, size_label)
            .filter(|a| !a.is_deleted())
            .map(|a| {
                a.deleted_at = Some(now);
                a.updated_at = now;
                a.clone()
            })
            .collect())
    }

    async fn restore_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>> {
        let mut state = self.state.lock().await;
        state.check_online("Failed to restore asset group")?;

        let now = Utc::now();
        Ok(state
            .in_group(group_code, size_label)
            .filter(|a| a.is_deleted())
            .map(|a| {
                a.deleted_at = None;
                a.updated_at = now;
                a.clone()
            })
            .collect())
    }

    async fn force_delete_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>> {
        let mut state = self.state.lock().await;
        state.check_online("Failed to purge asset group")?;

        let (removed, kept): (Vec<Asset>, Vec<Asset>) =
            std::mem::take(&mut state.rows).into_iter().partition(|a| {
                a.group_code == group_code && size_label.is_none_or(|l| &a.size_label == l)
            });
        state.rows = kept;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdnstore_core::error::ErrorKind;

    fn new_asset(group_code: &str, label: &str) -> NewAsset {
        NewAsset {
            group_code: group_code.to_string(),
            size_label: label.parse().unwrap(),
            file_name: format!("photo_{label}.jpg"),
            file_path: format!("images/gallery/photo_{label}.jpg"),
            file_size_bytes: 2048,
            owner_id: Uuid::nil(),
            subject: None,
            is_private: false,
            description: String::new(),
            has_optimized: label == SizeLabel::ORIGINAL,
        }
    }

    fn batch(group_code: &str, n: usize) -> Vec<NewAsset> {
        (0..n)
            .map(|i| new_asset(group_code, &format!("w{i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_create_many_is_all_or_nothing_on_injected_failure() {
        let repo = MemoryAssetRepository::new();
        let rows = batch("G1", 6);

        repo.fail_batch_at(Some(rows.len() / 2)).await;
        let err = repo.create_many(&rows).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(repo.snapshot().await.is_empty());

        repo.fail_batch_at(None).await;
        assert_eq!(repo.create_many(&rows).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_create_many_rejects_duplicate_label_without_partial_rows() {
        let repo = MemoryAssetRepository::new();
        let mut rows = batch("G1", 4);
        rows[2] = new_asset("G1", "w0");

        let err = repo.create_many(&rows).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(repo.count(&AssetFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scoped_lookups() {
        let repo = MemoryAssetRepository::new();
        let asset = repo.create(&new_asset("G1", "original")).await.unwrap();

        repo.soft_delete(asset.id).await.unwrap().unwrap();
        assert!(
            repo.find_by_id(asset.id, SoftDeleteScope::Active)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.find_by_id(asset.id, SoftDeleteScope::OnlyDeleted)
                .await
                .unwrap()
                .is_some()
        );
        // A second soft delete finds nothing to change.
        assert!(repo.soft_delete(asset.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_paginated_newest_first_with_independent_total() {
        let repo = MemoryAssetRepository::new();
        repo.create_many(&batch("G1", 5)).await.unwrap();

        let page = repo
            .find_paginated(&PageRequest::new(2, 2), &AssetFilter::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 3);
        let labels: Vec<&str> = page.items.iter().map(|a| a.size_label.as_str()).collect();
        assert_eq!(labels, vec!["w2", "w1"]);
    }

    #[tokio::test]
    async fn test_group_operations_respect_size_filter() {
        let repo = MemoryAssetRepository::new();
        repo.create_many(&[new_asset("G1", "original"), new_asset("G1", "small")])
            .await
            .unwrap();
        repo.create(&new_asset("G2", "original")).await.unwrap();

        let small: SizeLabel = "small".parse().unwrap();
        let deleted = repo.soft_delete_group("G1", Some(&small)).await.unwrap();
        assert_eq!(deleted.len(), 1);

        let purged = repo.force_delete_group("G1", None).await.unwrap();
        assert_eq!(purged.len(), 2);
        assert_eq!(repo.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let repo = MemoryAssetRepository::new();
        repo.set_offline(true).await;
        let err = repo
            .find_by_id(Uuid::nil(), SoftDeleteScope::Active)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
    }
}
