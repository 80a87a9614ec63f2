//! Repository traits and their PostgreSQL implementations.

pub mod asset;
pub mod sequence;

pub use asset::{AssetRepository, PgAssetRepository};
pub use sequence::{PgSequenceRepository, SequenceRepository};
