//! Pure functions for mapping storage errors to HTTP status codes.
//!
//! This module provides HTTP status code mappings for [`StorageError`] variants,
//! following the Functional Core pattern - pure functions with no side effects.

use super::{ExecutionErrorKind, StorageError};

/// Maps a [`StorageError`] to an HTTP status code.
///
/// - `Execution(UniqueViolation)` -> 409 (Conflict)
/// - `Execution(ForeignKeyViolation | ConstraintViolation)` -> 400 (Bad Request)
/// - `Execution(Connection)` -> 503 (Service Unavailable)
/// - `Uninitialized` -> 503 (Service Unavailable)
/// - `Statement`, `Execution(Other)` -> 500 (Internal Server Error)
/// - `Bootstrap` -> 503 if the store was unreachable, else 500
///
/// # Examples
///
/// ```
/// use userbase_core::storage::{storage_error_to_status_code, ExecutionErrorKind, StorageError};
///
/// let error = StorageError::execution(ExecutionErrorKind::UniqueViolation, "duplicate email");
/// assert_eq!(storage_error_to_status_code(&error), 409);
/// ```
pub fn storage_error_to_status_code(error: &StorageError) -> u16 {
    match error {
        StorageError::Execution { kind, .. } => match kind {
            ExecutionErrorKind::UniqueViolation => 409,
            ExecutionErrorKind::ForeignKeyViolation => 400,
            ExecutionErrorKind::ConstraintViolation => 400,
            ExecutionErrorKind::Connection => 503,
            ExecutionErrorKind::Other => 500,
        },
        StorageError::Uninitialized => 503,
        StorageError::Statement(_) => 500,
        StorageError::Bootstrap { source, .. } => match storage_error_to_status_code(source) {
            503 => 503,
            _ => 500,
        },
    }
}
