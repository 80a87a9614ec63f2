//! # cdnstore-database
//!
//! PostgreSQL connection management, the asset and sequence repository
//! traits with their PostgreSQL implementations, and in-memory
//! implementations for tests and offline tooling.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::{MemoryAssetRepository, MemorySequenceRepository};
pub use repositories::{
    AssetRepository, PgAssetRepository, PgSequenceRepository, SequenceRepository,
};
