use std::fmt;

use thiserror::Error;

/// Classification of an engine failure during bind or execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    /// A UNIQUE or PRIMARY KEY constraint rejected the statement.
    UniqueViolation,
    ForeignKeyViolation,
    /// NOT NULL, CHECK and other constraint failures.
    ConstraintViolation,
    /// The engine could not be reached or the session is gone.
    Connection,
    Other,
}

impl fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutionErrorKind::UniqueViolation => "unique constraint violation",
            ExecutionErrorKind::ForeignKeyViolation => "foreign key constraint violation",
            ExecutionErrorKind::ConstraintViolation => "constraint violation",
            ExecutionErrorKind::Connection => "connection failure",
            ExecutionErrorKind::Other => "engine error",
        };
        f.write_str(label)
    }
}

/// Errors that can occur in the storage core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// SQL text rejected by the engine's parser.
    #[error("Statement rejected: {0}")]
    Statement(String),
    /// Engine-level failure while binding or executing a statement.
    #[error("Execution failed ({kind}): {message}")]
    Execution {
        kind: ExecutionErrorKind,
        message: String,
    },
    #[error("Storage adapter has not been initialized")]
    Uninitialized,
    #[error("Failed to create table {table}: {source}")]
    Bootstrap {
        table: &'static str,
        #[source]
        source: Box<StorageError>,
    },
}

impl StorageError {
    pub fn execution(kind: ExecutionErrorKind, message: impl Into<String>) -> Self {
        Self::Execution {
            kind,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::execution(ExecutionErrorKind::Connection, message)
    }

    /// Kind of the execution failure, looking through bootstrap wrapping.
    pub fn execution_kind(&self) -> Option<ExecutionErrorKind> {
        match self {
            StorageError::Execution { kind, .. } => Some(*kind),
            StorageError::Bootstrap { source, .. } => source.execution_kind(),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.execution_kind() == Some(ExecutionErrorKind::UniqueViolation)
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
