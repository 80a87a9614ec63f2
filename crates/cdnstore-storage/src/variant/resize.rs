//! Image variant pipeline backed by the `image` crate.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

use cdnstore_core::config::VariantConfig;
use cdnstore_core::error::{AppError, ErrorKind};
use cdnstore_core::result::AppResult;
use cdnstore_core::traits::StorageProvider;
use cdnstore_entity::asset::SizeLabel;

use super::{ProcessedVariant, VariantPipeline};
use crate::paths;

/// A parsed size from configuration.
#[derive(Debug, Clone)]
struct TargetSize {
    label: SizeLabel,
    max_width: u32,
}

/// Writes one downscaled copy of the original per configured width.
///
/// Widths at or above the source width are skipped rather than upscaled.
#[derive(Debug, Clone)]
pub struct ImageVariantPipeline {
    /// Storage provider for reading originals and writing variants.
    provider: Arc<dyn StorageProvider>,
    sizes: Vec<TargetSize>,
}

impl ImageVariantPipeline {
    /// Create a pipeline from the variant configuration.
    pub fn new(provider: Arc<dyn StorageProvider>, config: &VariantConfig) -> AppResult<Self> {
        let mut sizes = Vec::with_capacity(config.sizes.len());
        for spec in &config.sizes {
            let label: SizeLabel = spec.label.parse().map_err(|e: AppError| {
                AppError::configuration(format!("Invalid variant label: {}", e.message))
            })?;
            if label.is_original() {
                return Err(AppError::configuration(
                    "The 'original' label cannot be used for a variant",
                ));
            }
            if spec.max_width == 0 {
                return Err(AppError::configuration(format!(
                    "Variant '{label}' must have a positive max_width"
                )));
            }
            if sizes.iter().any(|s: &TargetSize| s.label == label) {
                return Err(AppError::configuration(format!(
                    "Variant '{label}' is configured twice"
                )));
            }
            sizes.push(TargetSize {
                label,
                max_width: spec.max_width,
            });
        }
        Ok(Self { provider, sizes })
    }

    /// Decode the source and encode every applicable size.
    fn render(
        data: &[u8],
        base_file_name: &str,
        sizes: &[TargetSize],
    ) -> AppResult<Vec<(SizeLabel, String, Bytes)>> {
        let format = match ImageFormat::from_path(base_file_name) {
            Ok(format) => format,
            Err(_) => image::guess_format(data).map_err(|e| {
                AppError::validation(format!("Unrecognised image format: {e}"))
            })?,
        };
        let source = image::load_from_memory_with_format(data, format)
            .map_err(|e| AppError::validation(format!("Failed to decode image: {e}")))?;

        let mut rendered = Vec::new();
        for size in sizes {
            if size.max_width >= source.width() {
                continue;
            }
            let resized = source.thumbnail(size.max_width, source.height());
            let encoded = encode(resized, format)?;
            rendered.push((
                size.label.clone(),
                paths::variant_file_name(base_file_name, size.label.as_str()),
                encoded,
            ));
        }
        Ok(rendered)
    }
}

/// Encode an image in `format`. JPEG carries no alpha channel.
fn encode(image: DynamicImage, format: ImageFormat) -> AppResult<Bytes> {
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    };
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), format)
        .map_err(|e| AppError::internal(format!("Failed to encode variant: {e}")))?;
    Ok(Bytes::from(buf))
}

#[async_trait]
impl VariantPipeline for ImageVariantPipeline {
    async fn process(
        &self,
        source_path: &str,
        output_dir: &str,
        base_file_name: &str,
    ) -> AppResult<Vec<ProcessedVariant>> {
        let data = self.provider.read_bytes(source_path).await?;

        let sizes = self.sizes.clone();
        let base = base_file_name.to_string();
        let rendered = tokio::task::spawn_blocking(move || Self::render(&data, &base, &sizes))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Variant task panicked", e))??;

        let mut variants = Vec::with_capacity(rendered.len());
        let mut written: Vec<String> = Vec::with_capacity(rendered.len());
        for (size_label, file_name, bytes) in rendered {
            let path = paths::join(output_dir, &file_name);
            let file_size_bytes = bytes.len() as i64;
            if let Err(e) = self.provider.write(&path, bytes).await {
                self.discard(&written).await;
                return Err(e);
            }
            debug!(source = source_path, output = %path, label = %size_label, "Wrote variant");
            written.push(path);
            variants.push(ProcessedVariant {
                size_label,
                file_name,
                file_size_bytes,
            });
        }
        Ok(variants)
    }
}

impl ImageVariantPipeline {
    /// Remove variants written before a later write failed.
    async fn discard(&self, written: &[String]) {
        for path in written {
            if let Err(e) = self.provider.delete(path).await {
                warn!(path = %path, error = %e, "Failed to remove partially written variant");
            }
        }
    }
}
