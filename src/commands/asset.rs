//! Asset CLI commands.

use std::path::PathBuf;

use bytes::Bytes;
use clap::{Args, Subcommand};
use uuid::Uuid;

use cdnstore_core::error::{AppError, ErrorKind};
use cdnstore_core::types::{PageRequest, SoftDeleteScope};
use cdnstore_entity::asset::{AssetFilter, SizeLabel, SubjectKind, UpdateAsset};
use cdnstore_service::UploadRequest;

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for asset commands
#[derive(Debug, Args)]
pub struct AssetArgs {
    /// Asset subcommand
    #[command(subcommand)]
    pub command: AssetCommand,
}

/// Asset subcommands
#[derive(Debug, Subcommand)]
pub enum AssetCommand {
    /// List assets page by page
    List {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Items per page (max 100)
        #[arg(long, default_value_t = 10)]
        per_page: u64,
        /// Filter by subject kind
        #[arg(long)]
        subject_kind: Option<SubjectKind>,
        /// Filter by subject id
        #[arg(long)]
        subject_id: Option<i64>,
        /// Filter by size label
        #[arg(long)]
        size: Option<SizeLabel>,
        /// Soft-delete scope: active, with_deleted or only_deleted
        #[arg(long, default_value = "active")]
        scope: SoftDeleteScope,
    },
    /// Show one asset
    Show {
        /// Asset ID
        id: Uuid,
        /// Also find soft-deleted assets
        #[arg(long)]
        with_deleted: bool,
    },
    /// Show every asset of a group
    Group {
        /// Group code
        code: String,
        /// Only this size label
        #[arg(long)]
        size: Option<SizeLabel>,
        /// Soft-delete scope: active, with_deleted or only_deleted
        #[arg(long, default_value = "active")]
        scope: SoftDeleteScope,
    },
    /// Upload an image and derive its variants
    Upload {
        /// Image file to upload
        file: PathBuf,
        /// Target directory under images/
        #[arg(long)]
        dir: Option<String>,
        /// Subject kind the image belongs to
        #[arg(long)]
        subject_kind: Option<String>,
        /// Subject id the image belongs to
        #[arg(long)]
        subject_id: Option<i64>,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
        /// Hide the image from public listings
        #[arg(long)]
        private: bool,
        /// Uploading user
        #[arg(long, default_value_t = Uuid::nil())]
        owner: Uuid,
    },
    /// Change an asset's description or privacy flag
    Update {
        /// Asset ID
        id: Uuid,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New privacy flag
        #[arg(long)]
        private: Option<bool>,
    },
    /// Soft-delete an asset
    Delete {
        /// Asset ID
        id: Uuid,
    },
    /// Restore a soft-deleted asset
    Restore {
        /// Asset ID
        id: Uuid,
    },
    /// Permanently remove an asset and its file
    Purge {
        /// Asset ID
        id: Uuid,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// MIME type implied by a file extension.
fn mime_for_path(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Execute asset commands
pub async fn execute(
    args: &AssetArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        AssetCommand::List {
            page,
            per_page,
            subject_kind,
            subject_id,
            size,
            scope,
        } => {
            let filter = AssetFilter {
                subject_kind: *subject_kind,
                subject_id: *subject_id,
                size_label: size.clone(),
                scope: *scope,
            };
            let page = services
                .assets
                .list(&PageRequest::new(*page, *per_page), &filter)
                .await?;
            output::print_page(&page, format);
        }
        AssetCommand::Show { id, with_deleted } => {
            let scope = if *with_deleted {
                SoftDeleteScope::WithDeleted
            } else {
                SoftDeleteScope::Active
            };
            let asset = services.assets.get(*id, scope).await?;
            output::print_assets(std::slice::from_ref(&asset), format);
            if format == OutputFormat::Table {
                output::print_kv("URL", &services.assets.url(&asset));
            }
        }
        AssetCommand::Group { code, size, scope } => {
            let group = services.assets.group(code, size.as_ref(), *scope).await?;
            output::print_assets(&group.assets, format);
        }
        AssetCommand::Upload {
            file,
            dir,
            subject_kind,
            subject_id,
            description,
            private,
            owner,
        } => {
            let mime_type = mime_for_path(file).ok_or_else(|| {
                AppError::validation(format!("Unsupported image file: {}", file.display()))
            })?;
            let data = tokio::fs::read(file).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read {}", file.display()),
                    e,
                )
            })?;

            let group = services
                .upload
                .upload(UploadRequest {
                    original_name: file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    mime_type: mime_type.to_string(),
                    data: Bytes::from(data),
                    directory: dir.clone(),
                    owner_id: *owner,
                    subject_kind: subject_kind.clone(),
                    subject_id: *subject_id,
                    description: description.clone(),
                    is_private: *private,
                })
                .await?;

            if group.code.starts_with("ER-") {
                output::print_warning(&format!(
                    "Counter '{}' is unavailable; group got fallback code {}",
                    services.group_alias, group.code
                ));
            }
            output::print_assets(&group.assets, format);
        }
        AssetCommand::Update {
            id,
            description,
            private,
        } => {
            let asset = services
                .assets
                .update_details(
                    *id,
                    &UpdateAsset {
                        description: description.clone(),
                        is_private: *private,
                    },
                )
                .await?;
            output::print_assets(std::slice::from_ref(&asset), format);
        }
        AssetCommand::Delete { id } => {
            services.lifecycle.delete(*id).await?;
            output::print_success(&format!("Asset {id} deleted"));
        }
        AssetCommand::Restore { id } => {
            services.lifecycle.restore(*id).await?;
            output::print_success(&format!("Asset {id} restored"));
        }
        AssetCommand::Purge { id, yes } => {
            let prompt = format!("Permanently remove asset {id} and its file?");
            if !super::confirm(&prompt, *yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            let asset = services.lifecycle.force_delete(*id).await?;
            output::print_success(&format!("Asset {id} purged ({})", asset.file_path));
        }
    }

    Ok(())
}
