//! D1 HTTP API wire types.
//!
//! Request and response envelopes for `POST /accounts/{account}/d1/database/{db}/query`.

use serde::{Deserialize, Serialize};
use userbase_core::storage::{Row, Value};

/// Body of a query request.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub sql: &'a str,
    pub params: &'a [Value],
}

/// An error or message entry in the response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Top-level response envelope.
#[derive(Debug, Deserialize, Serialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub result: Option<Vec<QueryResult>>,
}

/// Result of one statement.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QueryResult {
    #[serde(default)]
    pub results: Vec<Row>,
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub meta: QueryMeta,
}

/// Statement metadata. D1 reports `last_row_id` as `null` for some statements.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QueryMeta {
    #[serde(default)]
    pub last_row_id: Option<i64>,
    #[serde(default)]
    pub changes: Option<u64>,
}

fn default_success() -> bool {
    true
}

impl Envelope {
    /// Joined error messages, for diagnostics.
    pub fn error_message(&self) -> String {
        if self.errors.is_empty() {
            return "D1 returned an unsuccessful response without errors".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_positional_params() {
        let params = [Value::from("alice"), Value::Integer(3), Value::Null];
        let request = QueryRequest {
            sql: "SELECT ?",
            params: &params,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"sql": "SELECT ?", "params": ["alice", 3, null]})
        );
    }

    #[test]
    fn test_envelope_with_null_row_id() {
        let envelope: Envelope = serde_json::from_value(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [{
                "results": [],
                "success": true,
                "meta": {"changed_db": true, "changes": 0, "duration": 0.2, "last_row_id": null}
            }]
        }))
        .unwrap();

        let result = &envelope.result.unwrap()[0];
        assert_eq!(result.meta.last_row_id, None);
        assert_eq!(result.meta.changes, Some(0));
    }

    #[test]
    fn test_envelope_rows_decode_as_value_maps() {
        let envelope: Envelope = serde_json::from_value(json!({
            "success": true,
            "result": [{"results": [{"id": 1, "username": "alice"}], "meta": {}}]
        }))
        .unwrap();

        let row = &envelope.result.unwrap()[0].results[0];
        assert_eq!(row.get("id"), Some(&Value::Integer(1)));
        assert_eq!(row.get("username"), Some(&Value::from("alice")));
    }

    #[test]
    fn test_error_message_joins_errors() {
        let envelope: Envelope = serde_json::from_value(json!({
            "success": false,
            "errors": [{"code": 7500, "message": "no such table: users"}],
            "result": null
        }))
        .unwrap();

        assert_eq!(envelope.error_message(), "no such table: users (code 7500)");
    }
}
