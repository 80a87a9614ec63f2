//! In-memory repository implementations.
//!
//! Both repositories keep their rows behind a Tokio mutex and mirror the
//! PostgreSQL constraints that matter to callers: unique
//! `(group_code, size_label)`, unique counter alias, all-or-nothing
//! batches and serialized counter advances. They also expose failure
//! switches so callers can exercise degraded paths.

pub mod asset;
pub mod sequence;

pub use asset::MemoryAssetRepository;
pub use sequence::MemorySequenceRepository;

use cdnstore_core::error::AppError;

/// The error returned while a memory repository is switched offline.
fn unavailable(operation: &str) -> AppError {
    AppError::database(format!("{operation}: store unavailable"))
}
