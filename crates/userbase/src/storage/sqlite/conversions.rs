//! SQLite value conversion functions.
//!
//! Pure functions for converting between SQLite values and the storage
//! core's [`Value`] union. These are testable in isolation without database access.

use rusqlite::types::{Type, ValueRef};
use userbase_core::storage::{Row, Value};

/// Convert a core value to an owned SQLite value for parameter binding.
pub fn to_sql_value(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Integer(v) => rusqlite::types::Value::Integer(*v),
        Value::Real(v) => rusqlite::types::Value::Real(*v),
        Value::Text(v) => rusqlite::types::Value::Text(v.clone()),
    }
}

/// Convert a borrowed SQLite column value to a core value.
///
/// BLOB columns have no counterpart in the value union and TEXT must be valid
/// UTF-8. Either case is reported as a conversion failure for that column.
pub fn from_value_ref(index: usize, value: ValueRef<'_>) -> rusqlite::Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(v) => Ok(Value::Integer(v)),
        ValueRef::Real(v) => Ok(Value::Real(v)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Value::Text(text.to_owned()))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))),
        ValueRef::Blob(_) => Err(rusqlite::Error::FromSqlConversionFailure(
            index,
            Type::Blob,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "BLOB columns are not supported",
            )),
        )),
    }
}

/// Convert a SQLite row to a column map.
///
/// `columns` must be the statement's column names in order.
pub fn row_to_map(columns: &[String], row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    columns
        .iter()
        .enumerate()
        .map(|(index, name)| Ok((name.clone(), from_value_ref(index, row.get_ref(index)?)?)))
        .collect()
}
