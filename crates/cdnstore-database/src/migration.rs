//! Schema migrations for the asset and sequence tables.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use cdnstore_core::error::{AppError, ErrorKind};

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration and return how many were applied.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, AppError> {
    let before = applied_count(pool).await?;
    info!(
        embedded = MIGRATOR.iter().count(),
        applied = before,
        "Running database migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    let after = applied_count(pool).await?;
    let newly_applied = after.saturating_sub(before);
    info!(newly_applied, "Database migrations completed");
    Ok(newly_applied)
}

/// Number of migrations recorded as applied. Zero before the first run.
async fn applied_count(pool: &PgPool) -> Result<usize, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to inspect migrations", e)
            })?;
    if !exists {
        return Ok(0);
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count migrations", e)
        })?;
    Ok(count.max(0) as usize)
}
