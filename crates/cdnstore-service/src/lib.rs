//! # cdnstore-service
//!
//! Business logic for cdnstore. Each service receives its repositories,
//! storage provider and pipeline at construction time as `Arc` trait
//! objects; nothing reads ambient global state.

pub mod asset;
pub mod sequence;

pub use asset::{AssetService, LifecycleManager, UploadRequest, UploadService};
pub use sequence::SequenceAllocator;
