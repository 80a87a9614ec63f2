//! Convenience result type alias for cdnstore.

use crate::error::AppError;

/// A specialized `Result` type for cdnstore operations.
pub type AppResult<T> = Result<T, AppError>;
