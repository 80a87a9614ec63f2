//! Polymorphic subject reference attached to an asset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use cdnstore_core::AppError;

/// The kind of record an asset is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subject_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// A gallery entry.
    Gallery,
    /// A catalogue item.
    Item,
    /// A payment record (receipts, proofs of transfer).
    Payment,
    /// A product.
    Product,
    /// A user profile.
    User,
}

impl SubjectKind {
    /// All accepted kinds.
    pub const ALL: [SubjectKind; 5] = [
        Self::Gallery,
        Self::Item,
        Self::Payment,
        Self::Product,
        Self::User,
    ];

    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::Item => "item",
            Self::Payment => "payment",
            Self::Product => "product",
            Self::User => "user",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Invalid subject kind: '{s}'. Expected one of: gallery, item, payment, product, user"
                ))
            })
    }
}

/// A validated reference to the record an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    /// Kind of the referenced record.
    pub kind: SubjectKind,
    /// Identifier of the referenced record.
    pub id: i64,
}

impl SubjectRef {
    /// Create a subject reference, rejecting non-positive identifiers.
    pub fn new(kind: SubjectKind, id: i64) -> Result<Self, AppError> {
        if id <= 0 {
            return Err(AppError::validation(format!(
                "Invalid subject id {id}: must be positive"
            )));
        }
        Ok(Self { kind, id })
    }

    /// Build a subject reference from loosely typed upload input.
    ///
    /// When an id is given without a kind, the kind is derived from the
    /// upload directory name. A kind without an id is rejected.
    pub fn from_input(
        kind: Option<&str>,
        id: Option<i64>,
        directory: &str,
    ) -> Result<Option<Self>, AppError> {
        match (kind, id) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(AppError::validation(
                "A subject kind was given without a subject id",
            )),
            (Some(kind), Some(id)) => Ok(Some(Self::new(kind.parse()?, id)?)),
            (None, Some(id)) => {
                let kind = directory.parse().map_err(|_| {
                    AppError::validation(format!(
                        "Cannot derive a subject kind from directory '{directory}'"
                    ))
                })?;
                Ok(Some(Self::new(kind, id)?))
            }
        }
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
