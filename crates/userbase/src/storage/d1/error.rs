//! D1 error mapping.
//!
//! Maps transport failures and D1 error envelopes to `StorageError` from
//! `userbase_core::storage`. D1 reports SQLite failures as message text, so
//! classification works on the message.

use reqwest::StatusCode;
use userbase_core::storage::{ExecutionErrorKind, StorageError};

/// Messages SQLite emits when it rejects the SQL text itself.
const STATEMENT_MARKERS: &[&str] = &[
    "syntax error",
    "incomplete input",
    "unrecognized token",
    "no such table",
    "no such column",
];

/// Classify a D1 error message.
///
/// # Error Mapping
///
/// - `UNIQUE constraint failed` → `UniqueViolation`
/// - `FOREIGN KEY constraint failed` → `ForeignKeyViolation`
/// - Other `constraint failed` messages → `ConstraintViolation`
/// - Parser rejections (syntax errors, unknown tables/columns) → `StorageError::Statement`
/// - All other messages → `Other`
pub fn map_message(message: &str) -> StorageError {
    let lower = message.to_lowercase();

    if STATEMENT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return StorageError::Statement(message.to_string());
    }

    let kind = if lower.contains("unique constraint failed") {
        ExecutionErrorKind::UniqueViolation
    } else if lower.contains("foreign key constraint failed") {
        ExecutionErrorKind::ForeignKeyViolation
    } else if lower.contains("constraint failed") {
        ExecutionErrorKind::ConstraintViolation
    } else {
        ExecutionErrorKind::Other
    };

    StorageError::execution(kind, message)
}

/// Whether the status means the service itself could not be used, regardless
/// of what the statement was.
pub fn is_service_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Map an unsuccessful HTTP status to an error, using `message` as detail.
pub fn map_status(status: StatusCode, message: String) -> StorageError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        StorageError::connection(format!("D1 rejected credentials ({status}): {message}"))
    } else if is_service_failure(status) {
        StorageError::connection(format!("D1 unavailable ({status}): {message}"))
    } else {
        StorageError::execution(
            ExecutionErrorKind::Other,
            format!("D1 request failed ({status}): {message}"),
        )
    }
}

/// Map a reqwest transport error.
pub fn map_transport_error(err: reqwest::Error) -> StorageError {
    if err.is_decode() {
        StorageError::execution(
            ExecutionErrorKind::Other,
            format!("Invalid D1 response: {err}"),
        )
    } else {
        StorageError::connection(format!("D1 request failed: {err}"))
    }
}
