//! Soft-delete visibility scope for lookups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which rows a lookup may see with respect to soft deletion.
///
/// Every lookup takes a scope explicitly; there is no ambient
/// "unscoped" toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftDeleteScope {
    /// Only rows whose `deleted_at` is null.
    #[default]
    Active,
    /// Active and soft-deleted rows.
    WithDeleted,
    /// Only soft-deleted rows.
    OnlyDeleted,
}

impl SoftDeleteScope {
    /// Check whether a row with the given deletion marker is visible.
    pub fn admits(&self, is_deleted: bool) -> bool {
        match self {
            Self::Active => !is_deleted,
            Self::WithDeleted => true,
            Self::OnlyDeleted => is_deleted,
        }
    }

    /// SQL predicate on `deleted_at` implementing this scope.
    pub fn sql_predicate(&self) -> &'static str {
        match self {
            Self::Active => "deleted_at IS NULL",
            Self::WithDeleted => "TRUE",
            Self::OnlyDeleted => "deleted_at IS NOT NULL",
        }
    }

    /// Return the scope as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::WithDeleted => "with_deleted",
            Self::OnlyDeleted => "only_deleted",
        }
    }
}

impl fmt::Display for SoftDeleteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SoftDeleteScope {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "with_deleted" => Ok(Self::WithDeleted),
            "only_deleted" => Ok(Self::OnlyDeleted),
            _ => Err(AppError::validation(format!(
                "Invalid scope: '{s}'. Expected one of: active, with_deleted, only_deleted"
            ))),
        }
    }
}
