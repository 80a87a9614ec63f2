//! Core traits defined in `cdnstore-core` and implemented by other crates.

pub mod storage;

pub use storage::StorageProvider;
