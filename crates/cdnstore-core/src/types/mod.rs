//! Core type definitions used across the cdnstore workspace.

pub mod pagination;
pub mod scope;

pub use pagination::{PageRequest, PageResponse};
pub use scope::SoftDeleteScope;
