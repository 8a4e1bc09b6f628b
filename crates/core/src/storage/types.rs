use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Value reported as `last_row_id` when the engine cannot provide one.
///
/// The remote engine answers `null` for statements that did not insert a row;
/// adapters substitute this value so callers never see an engine-specific null.
pub const LAST_ROW_ID_SENTINEL: i64 = -1;

/// A single SQL value, used both for bound parameters and for row columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One result row: column name to value.
///
/// Typed projection is left to the caller through [`Row::decode`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.0.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Project the row onto a typed record by column name.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::to_value(&self.0).and_then(serde_json::from_value)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Rows returned by a multi-row read, shaped as `{"results": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub results: Vec<Row>,
}

impl RowSet {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        self.results.iter().map(Row::decode).collect()
    }
}

/// Metadata reported by a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationMeta {
    pub last_row_id: i64,
    pub changes: u64,
}

/// Outcome of `run()`, shaped as `{"success": true, "meta": {...}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub success: bool,
    pub meta: MutationMeta,
}

impl MutationOutcome {
    /// Successful outcome; a missing row id is replaced by [`LAST_ROW_ID_SENTINEL`].
    pub fn completed(last_row_id: Option<i64>, changes: u64) -> Self {
        Self {
            success: true,
            meta: MutationMeta {
                last_row_id: last_row_id.unwrap_or(LAST_ROW_ID_SENTINEL),
                changes,
            },
        }
    }
}

/// Shape the caller expects an execution to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Zero or one row.
    First,
    /// Zero or more rows.
    All,
    /// Side effects only.
    Run,
}

/// Result of executing a bound statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Row(Option<Row>),
    Rows(RowSet),
    Mutation(MutationOutcome),
}

impl ExecutionResult {
    pub fn into_row(self) -> Option<Row> {
        match self {
            Self::Row(row) => row,
            Self::Rows(set) => set.results.into_iter().next(),
            Self::Mutation(_) => None,
        }
    }

    pub fn into_rows(self) -> RowSet {
        match self {
            Self::Row(row) => RowSet {
                results: row.into_iter().collect(),
            },
            Self::Rows(set) => set,
            Self::Mutation(_) => RowSet::default(),
        }
    }

    pub fn into_mutation(self) -> Option<MutationOutcome> {
        match self {
            Self::Mutation(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Which physical engine answers for an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    Embedded,
    Remote,
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterKind::Embedded => write!(f, "embedded"),
            AdapterKind::Remote => write!(f, "remote"),
        }
    }
}
