//! Asset entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use cdnstore_core::AppError;
use cdnstore_core::types::SoftDeleteScope;

use super::size::SizeLabel;
use super::state::LifecycleState;
use super::subject::{SubjectKind, SubjectRef};

/// One stored image: either the uploaded original or a derived variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Unique asset identifier.
    pub id: Uuid,
    /// Code shared by the original and every variant produced from it.
    pub group_code: String,
    /// `"original"` or a pipeline-defined size label.
    pub size_label: SizeLabel,
    /// File name within its directory.
    pub file_name: String,
    /// Path relative to the storage root (`images/{dir}/{file}`).
    pub file_path: String,
    /// File size in bytes.
    pub file_size_bytes: i64,
    /// The uploading user.
    pub owner_id: Uuid,
    /// Kind of the record this asset is attached to.
    pub subject_kind: Option<SubjectKind>,
    /// Identifier of the record this asset is attached to.
    pub subject_id: Option<i64>,
    /// Whether the asset is hidden from public listings.
    pub is_private: bool,
    /// Free-form description.
    pub description: String,
    /// True on the original once variants were produced from it.
    pub has_optimized: bool,
    /// When the asset was created.
    pub created_at: DateTime<Utc>,
    /// When the asset was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the asset was soft-deleted; `None` while active.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Asset {
    /// Whether the asset is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Current lifecycle state of a stored row.
    pub fn state(&self) -> LifecycleState {
        if self.is_deleted() {
            LifecycleState::SoftDeleted
        } else {
            LifecycleState::Active
        }
    }

    /// Whether this is the group's original upload.
    pub fn is_original(&self) -> bool {
        self.size_label.is_original()
    }

    /// The subject reference, when both halves are present.
    pub fn subject(&self) -> Option<SubjectRef> {
        match (self.subject_kind, self.subject_id) {
            (Some(kind), Some(id)) => Some(SubjectRef { kind, id }),
            _ => None,
        }
    }

    /// Public URL of the stored file.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.file_path.trim_start_matches('/')
        )
    }
}

/// Data required to create a new asset record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    /// Group code allocated for the upload.
    pub group_code: String,
    /// Size label.
    pub size_label: SizeLabel,
    /// File name within its directory.
    pub file_name: String,
    /// Path relative to the storage root.
    pub file_path: String,
    /// File size in bytes.
    pub file_size_bytes: i64,
    /// The uploading user.
    pub owner_id: Uuid,
    /// Optional subject reference.
    pub subject: Option<SubjectRef>,
    /// Privacy flag.
    pub is_private: bool,
    /// Free-form description.
    pub description: String,
    /// Whether variants were produced from this asset.
    pub has_optimized: bool,
}

impl NewAsset {
    /// Check the fields a row cannot be stored without.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.group_code.trim().is_empty() {
            return Err(AppError::validation("Asset group code cannot be empty"));
        }
        if self.file_path.trim().is_empty() {
            return Err(AppError::validation("Asset file path cannot be empty"));
        }
        if self.file_size_bytes < 0 {
            return Err(AppError::validation(format!(
                "Asset file size cannot be negative: {}",
                self.file_size_bytes
            )));
        }
        Ok(())
    }

    /// Subject kind column value.
    pub fn subject_kind(&self) -> Option<SubjectKind> {
        self.subject.map(|s| s.kind)
    }

    /// Subject id column value.
    pub fn subject_id(&self) -> Option<i64> {
        self.subject.map(|s| s.id)
    }
}

/// Editable asset details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAsset {
    /// New description.
    pub description: Option<String>,
    /// New privacy flag.
    pub is_private: Option<bool>,
}

impl UpdateAsset {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.is_private.is_none()
    }
}

/// Filters for listing assets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetFilter {
    /// Only assets attached to this kind of subject.
    pub subject_kind: Option<SubjectKind>,
    /// Only assets attached to this subject id.
    pub subject_id: Option<i64>,
    /// Only assets with this size label.
    pub size_label: Option<SizeLabel>,
    /// Soft-delete visibility.
    #[serde(default)]
    pub scope: SoftDeleteScope,
}

impl AssetFilter {
    /// Check whether an asset satisfies every filter.
    pub fn matches(&self, asset: &Asset) -> bool {
        self.scope.admits(asset.is_deleted())
            && self
                .subject_kind
                .is_none_or(|kind| asset.subject_kind == Some(kind))
            && self.subject_id.is_none_or(|id| asset.subject_id == Some(id))
            && self
                .size_label
                .as_ref()
                .is_none_or(|label| &asset.size_label == label)
    }
}
