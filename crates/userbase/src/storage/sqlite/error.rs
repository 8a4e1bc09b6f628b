//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `StorageError` from `userbase_core::storage`.
//! Constraint failures are classified by their extended result code.

use rusqlite::ffi;
use userbase_core::storage::{ExecutionErrorKind, StorageError};

/// Maps a rusqlite error raised while executing a statement.
///
/// # Error Mapping
///
/// - `SQLITE_CONSTRAINT_UNIQUE` / `SQLITE_CONSTRAINT_PRIMARYKEY` → `UniqueViolation`
/// - `SQLITE_CONSTRAINT_FOREIGNKEY` → `ForeignKeyViolation`
/// - Any other constraint code → `ConstraintViolation`
/// - Connection errors → `Connection`
/// - All other errors → `Other`
fn map_rusqlite_error(err: &rusqlite::Error) -> StorageError {
    let kind = match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            ExecutionErrorKind::UniqueViolation
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            ExecutionErrorKind::ForeignKeyViolation
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ExecutionErrorKind::ConstraintViolation
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            ExecutionErrorKind::Connection
        }

        _ => ExecutionErrorKind::Other,
    };

    StorageError::execution(kind, err.to_string())
}

/// Maps a tokio_rusqlite error raised while executing a statement.
///
/// This is the main entry point for error mapping in async code.
pub fn map_tokio_rusqlite_error(err: tokio_rusqlite::Error) -> StorageError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => map_rusqlite_error(rusqlite_err),
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_) => {
            StorageError::connection("Connection closed unexpectedly")
        }
        _ => StorageError::execution(ExecutionErrorKind::Other, err.to_string()),
    }
}

/// Maps a tokio_rusqlite error raised while preparing a statement.
///
/// Anything the engine reports about the SQL text itself becomes
/// `StorageError::Statement`; session failures keep their execution mapping.
pub fn map_prepare_error(err: tokio_rusqlite::Error) -> StorageError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(sqlite_err, _))
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            map_tokio_rusqlite_error(err)
        }
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            StorageError::Statement(rusqlite_err.to_string())
        }
        _ => map_tokio_rusqlite_error(err),
    }
}
