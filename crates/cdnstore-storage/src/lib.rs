//! # cdnstore-storage
//!
//! Physical file storage for cdnstore: the local filesystem provider, an
//! in-memory provider, storage path conventions, and the image variant
//! pipeline that derives resized copies of an uploaded original.

pub mod paths;
pub mod providers;
pub mod variant;

pub use providers::{LocalStorageProvider, MemoryStorageProvider};
pub use variant::{ImageVariantPipeline, ProcessedVariant, VariantPipeline};
