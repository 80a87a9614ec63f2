//! Sequence counter repository trait and PostgreSQL implementation.

use std::fmt;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cdnstore_core::error::{AppError, ErrorKind};
use cdnstore_core::result::AppResult;
use cdnstore_entity::sequence::{CodePlan, DateTag, NewSequenceCounter, SequenceCounter};

/// Unique constraint on `alias`.
const ALIAS_KEY: &str = "sequence_counters_alias_key";

/// Persistence contract for sequence counters.
#[async_trait]
pub trait SequenceRepository: Send + Sync + fmt::Debug {
    /// Find a counter by alias.
    async fn find_by_alias(&self, alias: &str) -> AppResult<Option<SequenceCounter>>;

    /// List every counter ordered by alias.
    async fn list(&self) -> AppResult<Vec<SequenceCounter>>;

    /// Seed a new counter.
    async fn create(&self, data: &NewSequenceCounter) -> AppResult<SequenceCounter>;

    /// Plan the next code for `today` and store the advanced counter as
    /// one atomic step.
    ///
    /// Concurrent callers for the same alias are serialized, so each one
    /// plans against the values the previous one stored. Returns `None`
    /// when no counter exists for `alias`.
    async fn advance(&self, alias: &str, today: &DateTag) -> AppResult<Option<CodePlan>>;
}

/// PostgreSQL-backed sequence repository.
#[derive(Debug, Clone)]
pub struct PgSequenceRepository {
    pool: PgPool,
}

impl PgSequenceRepository {
    /// Create a new sequence repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceRepository for PgSequenceRepository {
    async fn find_by_alias(&self, alias: &str) -> AppResult<Option<SequenceCounter>> {
        sqlx::query_as::<_, SequenceCounter>("SELECT * FROM sequence_counters WHERE alias = $1")
            .bind(alias)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find sequence counter", e)
            })
    }

    async fn list(&self) -> AppResult<Vec<SequenceCounter>> {
        sqlx::query_as::<_, SequenceCounter>("SELECT * FROM sequence_counters ORDER BY alias ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list sequence counters", e)
            })
    }

    async fn create(&self, data: &NewSequenceCounter) -> AppResult<SequenceCounter> {
        data.validate()?;
        sqlx::query_as::<_, SequenceCounter>(
            "INSERT INTO sequence_counters (id, alias, prefix, suffix, queue, separator) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.alias)
        .bind(&data.prefix)
        .bind(&data.suffix)
        .bind(data.queue)
        .bind(&data.separator)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(ALIAS_KEY) => {
                AppError::conflict(format!("Sequence counter '{}' already exists", data.alias))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create sequence counter", e),
        })
    }

    async fn advance(&self, alias: &str, today: &DateTag) -> AppResult<Option<CodePlan>> {
        let write_err = |e: sqlx::Error| {
            AppError::with_source(ErrorKind::Database, "Failed to advance sequence counter", e)
        };

        let mut tx = self.pool.begin().await.map_err(write_err)?;

        // The row lock is held until commit, so no other caller can plan
        // against the same snapshot.
        let counter = sqlx::query_as::<_, SequenceCounter>(
            "SELECT * FROM sequence_counters WHERE alias = $1 FOR UPDATE",
        )
        .bind(alias)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_err)?;

        let Some(counter) = counter else {
            tx.rollback().await.map_err(write_err)?;
            return Ok(None);
        };

        let plan = counter.plan(today);
        sqlx::query(
            "UPDATE sequence_counters SET queue = $2, separator = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(counter.id)
        .bind(plan.next_queue)
        .bind(&plan.next_separator)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        tx.commit().await.map_err(write_err)?;
        Ok(Some(plan))
    }
}
