//! Sequence counter entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use cdnstore_core::AppError;

use super::date_tag::DateTag;
use super::plan::{QUEUE_MAX, QUEUE_MIN};

/// A named counter producing human-readable codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SequenceCounter {
    /// Unique counter identifier.
    pub id: Uuid,
    /// Unique name the counter is looked up by.
    pub alias: String,
    /// Prepended to every code when non-empty.
    pub prefix: Option<String>,
    /// Appended to every code when non-empty.
    pub suffix: Option<String>,
    /// Next number to hand out, in `[1, 9999]`.
    pub queue: i32,
    /// `YYMMDD` tag of the period `queue` belongs to.
    pub separator: String,
    /// When the counter was created.
    pub created_at: DateTime<Utc>,
    /// When the counter was last advanced.
    pub updated_at: DateTime<Utc>,
}

/// Data required to seed a counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSequenceCounter {
    /// Unique alias.
    pub alias: String,
    /// Optional prefix.
    pub prefix: Option<String>,
    /// Optional suffix.
    pub suffix: Option<String>,
    /// Starting queue value.
    pub queue: i32,
    /// Starting period tag.
    pub separator: String,
}

impl NewSequenceCounter {
    /// Seed a counter starting at 1 in the period of `today`.
    pub fn starting(alias: impl Into<String>, today: &DateTag) -> Self {
        Self {
            alias: alias.into(),
            prefix: None,
            suffix: None,
            queue: QUEUE_MIN,
            separator: today.as_str().to_string(),
        }
    }

    /// Check that the seed satisfies the counter invariants.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.alias.trim().is_empty() {
            return Err(AppError::validation("Counter alias cannot be empty"));
        }
        if !(QUEUE_MIN..=QUEUE_MAX).contains(&self.queue) {
            return Err(AppError::validation(format!(
                "Counter queue {} is outside [{QUEUE_MIN}, {QUEUE_MAX}]",
                self.queue
            )));
        }
        if DateTag::parse(&self.separator).is_none() {
            return Err(AppError::validation(format!(
                "Counter separator '{}' is not a YYMMDD date",
                self.separator
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_validation() {
        let today = DateTag::parse("260117").unwrap();
        let seed = NewSequenceCounter::starting("gallery_group", &today);
        assert!(seed.validate().is_ok());

        let bad = NewSequenceCounter {
            queue: 10_000,
            ..seed.clone()
        };
        assert!(bad.validate().is_err());

        let bad = NewSequenceCounter {
            separator: "yesterday".into(),
            ..seed
        };
        assert!(bad.validate().is_err());
    }
}
