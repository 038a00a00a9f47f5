//! Result type alias for facsync operations

use crate::domain::errors::SyncError;

/// Result type alias using [`SyncError`] as the error type
pub type Result<T> = std::result::Result<T, SyncError>;
