//! Backend-agnostic storage contract.
//!
//! Value types, the error taxonomy and the [`StorageEngine`] trait that the
//! embedded and remote adapters implement.

mod error;
mod http_mapping;
mod statement;
mod traits;
mod types;

pub use error::{ExecutionErrorKind, Result, StorageError};
pub use http_mapping::storage_error_to_status_code;
pub use statement::Statement;
pub use traits::StorageEngine;
pub use types::{
    AdapterKind, ExecutionResult, Expect, MutationMeta, MutationOutcome, Row, RowSet, Value,
    LAST_ROW_ID_SENTINEL,
};
