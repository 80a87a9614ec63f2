//! Asset lifecycle state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use cdnstore_core::AppError;

/// Lifecycle state of an asset row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Visible to default lookups.
    Active,
    /// `deleted_at` is set; the row is retained and can be restored.
    SoftDeleted,
    /// The row and its file are gone. Terminal.
    Purged,
}

/// A requested lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Active -> SoftDeleted.
    Delete,
    /// SoftDeleted -> Active.
    Restore,
    /// Active | SoftDeleted -> Purged.
    Purge,
}

impl LifecycleState {
    /// Return the state as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::SoftDeleted => "soft_deleted",
            Self::Purged => "purged",
        }
    }

    /// Apply an action, returning the resulting state or a conflict error
    /// when the transition does not exist.
    pub fn apply(self, action: LifecycleAction) -> Result<LifecycleState, AppError> {
        match (self, action) {
            (Self::Active, LifecycleAction::Delete) => Ok(Self::SoftDeleted),
            (Self::SoftDeleted, LifecycleAction::Restore) => Ok(Self::Active),
            (Self::Active | Self::SoftDeleted, LifecycleAction::Purge) => Ok(Self::Purged),
            (state, action) => Err(AppError::conflict(format!(
                "Cannot {} an asset that is {}",
                action.as_str(),
                state.as_str()
            ))),
        }
    }
}

impl LifecycleAction {
    /// Return the action as a lowercase verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Restore => "restore",
            Self::Purge => "purge",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use LifecycleAction::*;
        use LifecycleState::*;

        assert_eq!(Active.apply(Delete).unwrap(), SoftDeleted);
        assert_eq!(SoftDeleted.apply(Restore).unwrap(), Active);
        assert_eq!(Active.apply(Purge).unwrap(), Purged);
        assert_eq!(SoftDeleted.apply(Purge).unwrap(), Purged);
    }

    #[test]
    fn test_illegal_transitions() {
        use LifecycleAction::*;
        use LifecycleState::*;

        assert!(Active.apply(Restore).is_err());
        assert!(SoftDeleted.apply(Delete).is_err());
        for action in [Delete, Restore, Purge] {
            assert!(Purged.apply(action).is_err());
        }
    }
}
