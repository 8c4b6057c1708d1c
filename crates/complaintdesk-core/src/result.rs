//! Convenience result type alias for ComplaintDesk.

use crate::error::AppError;

/// A specialized `Result` type for ComplaintDesk operations.
pub type AppResult<T> = Result<T, AppError>;
