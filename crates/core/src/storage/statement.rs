use std::fmt;
use std::sync::Arc;

use super::{Result, StorageError};

/// A parsed SQL statement, owned by the adapter that prepared it.
///
/// Cloning is cheap; the SQL text is shared and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct Statement {
    sql: Arc<str>,
}

impl Statement {
    /// Wraps SQL text, rejecting text that contains no statement at all.
    pub fn new(sql: &str) -> Result<Self> {
        let trimmed = sql.trim();
        if trimmed.trim_end_matches(';').trim().is_empty() {
            return Err(StorageError::Statement("empty SQL statement".to_string()));
        }
        Ok(Self {
            sql: Arc::from(trimmed),
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Statement").field(&&*self.sql).finish()
    }
}
