//! Asset repository trait and PostgreSQL implementation.

use std::fmt;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cdnstore_core::error::{AppError, ErrorKind};
use cdnstore_core::result::AppResult;
use cdnstore_core::types::{PageRequest, PageResponse, SoftDeleteScope};
use cdnstore_entity::asset::{Asset, AssetFilter, NewAsset, SizeLabel, UpdateAsset};

/// Unique constraint on `(group_code, size_label)`.
const GROUP_LABEL_KEY: &str = "assets_group_code_size_label_key";

/// Persistence contract for asset rows.
///
/// Single-row transitions return `None` when no row satisfied the
/// precondition (missing, or already in the target state). Group
/// operations return every row they changed.
#[async_trait]
pub trait AssetRepository: Send + Sync + fmt::Debug {
    /// List assets matching `filter`, one page at a time. The total is
    /// counted separately with the same filter.
    async fn find_paginated(
        &self,
        page: &PageRequest,
        filter: &AssetFilter,
    ) -> AppResult<PageResponse<Asset>>;

    /// Count assets matching `filter`.
    async fn count(&self, filter: &AssetFilter) -> AppResult<u64>;

    /// Find an asset by ID under the given soft-delete scope.
    async fn find_by_id(&self, id: Uuid, scope: SoftDeleteScope) -> AppResult<Option<Asset>>;

    /// Find the rows of a group, optionally narrowed to one size label.
    async fn find_by_group_code(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
        scope: SoftDeleteScope,
    ) -> AppResult<Vec<Asset>>;

    /// Insert one asset.
    async fn create(&self, data: &NewAsset) -> AppResult<Asset>;

    /// Insert a batch of assets. Either every row is stored or none is.
    async fn create_many(&self, data: &[NewAsset]) -> AppResult<Vec<Asset>>;

    /// Change the description and/or privacy flag of an active asset.
    async fn update_details(&self, id: Uuid, update: &UpdateAsset) -> AppResult<Option<Asset>>;

    /// Mark an active asset as deleted.
    async fn soft_delete(&self, id: Uuid) -> AppResult<Option<Asset>>;

    /// Clear the deletion mark of a soft-deleted asset.
    async fn restore(&self, id: Uuid) -> AppResult<Option<Asset>>;

    /// Remove a row regardless of its deletion mark, returning it.
    async fn force_delete(&self, id: Uuid) -> AppResult<Option<Asset>>;

    /// Soft-delete every active row of a group.
    async fn soft_delete_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>>;

    /// Restore every soft-deleted row of a group.
    async fn restore_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>>;

    /// Remove every row of a group regardless of deletion marks.
    async fn force_delete_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>>;
}

/// PostgreSQL-backed asset repository.
#[derive(Debug, Clone)]
pub struct PgAssetRepository {
    pool: PgPool,
}

impl PgAssetRepository {
    /// Create a new asset repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the `WHERE` clause for a filter. Returns the clause and the
    /// index of the next free bind parameter.
    fn where_clause(filter: &AssetFilter) -> (String, u32) {
        let mut conditions = vec![filter.scope.sql_predicate().to_string()];
        let mut param_idx = 1u32;

        if filter.subject_kind.is_some() {
            conditions.push(format!("subject_kind = ${param_idx}"));
            param_idx += 1;
        }
        if filter.subject_id.is_some() {
            conditions.push(format!("subject_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.size_label.is_some() {
            conditions.push(format!("size_label = ${param_idx}"));
            param_idx += 1;
        }

        (format!("WHERE {}", conditions.join(" AND ")), param_idx)
    }
}

/// Map an insert failure, turning a duplicate `(group_code, size_label)`
/// into a conflict.
fn insert_error(e: sqlx::Error, data: &NewAsset) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(GROUP_LABEL_KEY) => {
            AppError::conflict(format!(
                "Group '{}' already has a '{}' asset",
                data.group_code, data.size_label
            ))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to create asset", e),
    }
}

/// Insert one row on any executor (pool or open transaction).
async fn insert<'e, E>(executor: E, data: &NewAsset) -> AppResult<Asset>
where
    E: sqlx::PgExecutor<'e>,
{
    data.validate()?;
    sqlx::query_as::<_, Asset>(
        "INSERT INTO assets (id, group_code, size_label, file_name, file_path, file_size_bytes, \
         owner_id, subject_kind, subject_id, is_private, description, has_optimized) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&data.group_code)
    .bind(data.size_label.as_str())
    .bind(&data.file_name)
    .bind(&data.file_path)
    .bind(data.file_size_bytes)
    .bind(data.owner_id)
    .bind(data.subject_kind())
    .bind(data.subject_id())
    .bind(data.is_private)
    .bind(&data.description)
    .bind(data.has_optimized)
    .fetch_one(executor)
    .await
    .map_err(|e| insert_error(e, data))
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    async fn find_paginated(
        &self,
        page: &PageRequest,
        filter: &AssetFilter,
    ) -> AppResult<PageResponse<Asset>> {
        let (where_clause, param_idx) = Self::where_clause(filter);
        let select_sql = format!(
            "SELECT * FROM assets {where_clause} ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut select_query = sqlx::query_as::<_, Asset>(&select_sql);
        if let Some(kind) = filter.subject_kind {
            select_query = select_query.bind(kind);
        }
        if let Some(id) = filter.subject_id {
            select_query = select_query.bind(id);
        }
        if let Some(label) = &filter.size_label {
            select_query = select_query.bind(label.as_str().to_string());
        }

        let total = self.count(filter).await?;

        let items = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list assets", e))?;

        Ok(PageResponse::new(items, page.page, page.per_page, total))
    }

    async fn count(&self, filter: &AssetFilter) -> AppResult<u64> {
        let (where_clause, _) = Self::where_clause(filter);
        let count_sql = format!("SELECT COUNT(*) FROM assets {where_clause}");

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(kind) = filter.subject_kind {
            count_query = count_query.bind(kind);
        }
        if let Some(id) = filter.subject_id {
            count_query = count_query.bind(id);
        }
        if let Some(label) = &filter.size_label {
            count_query = count_query.bind(label.as_str().to_string());
        }

        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count assets", e))?;
        Ok(total.max(0) as u64)
    }

    async fn find_by_id(&self, id: Uuid, scope: SoftDeleteScope) -> AppResult<Option<Asset>> {
        let sql = format!(
            "SELECT * FROM assets WHERE id = $1 AND {}",
            scope.sql_predicate()
        );
        sqlx::query_as::<_, Asset>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find asset", e))
    }

    async fn find_by_group_code(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
        scope: SoftDeleteScope,
    ) -> AppResult<Vec<Asset>> {
        let sql = format!(
            "SELECT * FROM assets WHERE group_code = $1 \
             AND ($2::TEXT IS NULL OR size_label = $2) AND {} \
             ORDER BY created_at ASC, id ASC",
            scope.sql_predicate()
        );
        sqlx::query_as::<_, Asset>(&sql)
            .bind(group_code)
            .bind(size_label.map(SizeLabel::as_str))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find asset group", e)
            })
    }

    async fn create(&self, data: &NewAsset) -> AppResult<Asset> {
        insert(&self.pool, data).await
    }

    async fn create_many(&self, data: &[NewAsset]) -> AppResult<Vec<Asset>> {
        for item in data {
            item.validate()?;
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut created = Vec::with_capacity(data.len());
        for item in data {
            // Dropping `tx` on error rolls the whole batch back.
            created.push(insert(&mut *tx, item).await?);
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit asset batch", e)
        })?;

        Ok(created)
    }

    async fn update_details(&self, id: Uuid, update: &UpdateAsset) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET description = COALESCE($2, description), \
             is_private = COALESCE($3, is_private), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(update.description.as_deref())
        .bind(update.is_private)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update asset", e))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete asset", e))
    }

    async fn restore(&self, id: Uuid) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NOT NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to restore asset", e))
    }

    async fn force_delete(&self, id: Uuid) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("DELETE FROM assets WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge asset", e))
    }

    async fn soft_delete_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET deleted_at = NOW(), updated_at = NOW() \
             WHERE group_code = $1 AND ($2::TEXT IS NULL OR size_label = $2) \
             AND deleted_at IS NULL RETURNING *",
        )
        .bind(group_code)
        .bind(size_label.map(SizeLabel::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete asset group", e)
        })
    }

    async fn restore_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET deleted_at = NULL, updated_at = NOW() \
             WHERE group_code = $1 AND ($2::TEXT IS NULL OR size_label = $2) \
             AND deleted_at IS NOT NULL RETURNING *",
        )
        .bind(group_code)
        .bind(size_label.map(SizeLabel::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to restore asset group", e)
        })
    }

    async fn force_delete_group(
        &self,
        group_code: &str,
        size_label: Option<&SizeLabel>,
    ) -> AppResult<Vec<Asset>> {
        sqlx::query_as::<_, Asset>(
            "DELETE FROM assets WHERE group_code = $1 \
             AND ($2::TEXT IS NULL OR size_label = $2) RETURNING *",
        )
        .bind(group_code)
        .bind(size_label.map(SizeLabel::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to purge asset group", e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdnstore_entity::asset::SubjectKind;

    #[test]
    fn test_where_clause_numbers_parameters() {
        let filter = AssetFilter {
            subject_kind: Some(SubjectKind::Product),
            subject_id: None,
            size_label: Some(SizeLabel::original()),
            scope: SoftDeleteScope::WithDeleted,
        };
        let (clause, next) = PgAssetRepository::where_clause(&filter);
        assert_eq!(clause, "WHERE TRUE AND subject_kind = $1 AND size_label = $2");
        assert_eq!(next, 3);
    }

    #[test]
    fn test_where_clause_default_scope() {
        let (clause, next) = PgAssetRepository::where_clause(&AssetFilter::default());
        assert_eq!(clause, "WHERE deleted_at IS NULL");
        assert_eq!(next, 1);
    }
}
