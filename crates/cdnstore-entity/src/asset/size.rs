//! Size label of an asset within its group.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cdnstore_core::AppError;

/// Label distinguishing the original upload from its derived variants.
///
/// The set is open: `"original"` is reserved, every other label is
/// defined by the variant pipeline configuration (`"small"`, `"medium"`,
/// `"large"` by default).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct SizeLabel(String);

impl SizeLabel {
    /// Label of the uploaded original.
    pub const ORIGINAL: &'static str = "original";

    /// The label of the uploaded original.
    pub fn original() -> Self {
        Self(Self::ORIGINAL.to_string())
    }

    /// Whether this label marks the uploaded original.
    pub fn is_original(&self) -> bool {
        self.0 == Self::ORIGINAL
    }

    /// Return the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SizeLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        if label.is_empty() {
            return Err(AppError::validation("Size label cannot be empty"));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::validation(format!(
                "Invalid size label: '{s}'. Use letters, digits, '_' or '-'"
            )));
        }
        Ok(Self(label))
    }
}
