//! Derived size variants of an uploaded original.

pub mod resize;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cdnstore_core::result::AppResult;
use cdnstore_entity::asset::SizeLabel;

pub use self::resize::ImageVariantPipeline;

/// One variant written by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedVariant {
    /// Label of the derived size.
    pub size_label: SizeLabel,
    /// File name within the output directory.
    pub file_name: String,
    /// Size of the written file.
    pub file_size_bytes: i64,
}

/// Produces resized copies of a stored original.
#[async_trait]
pub trait VariantPipeline: Send + Sync + std::fmt::Debug {
    /// Derive variants of `source_path`, writing them into `output_dir`
    /// with names derived from `base_file_name`. Returns the written
    /// variants in configuration order.
    async fn process(
        &self,
        source_path: &str,
        output_dir: &str,
        base_file_name: &str,
    ) -> AppResult<Vec<ProcessedVariant>>;
}
