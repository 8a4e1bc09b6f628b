//! In-process stand-in for the D1 query endpoint, used by tests.
//!
//! Serves `POST /accounts/{account}/d1/database/{db}/query` from an in-memory
//! SQLite database and answers with the same envelope shape as the real API.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use rusqlite::types::ValueRef;
use serde_json::{json, Value as JsonValue};

use super::adapter::D1Config;

const TOKEN: &str = "test-token";

#[derive(Clone)]
struct FakeState {
    conn: Arc<Mutex<rusqlite::Connection>>,
    requests: Arc<AtomicUsize>,
}

/// A running fake D1 server bound to an ephemeral local port.
pub struct FakeD1 {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

impl FakeD1 {
    pub async fn start() -> Self {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));
        let state = FakeState {
            conn: Arc::new(Mutex::new(conn)),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route(
                "/accounts/{account}/d1/database/{database}/query",
                post(query),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn config(&self) -> D1Config {
        D1Config {
            account_id: "test-account".to_string(),
            database_id: "test-db".to_string(),
            api_token: TOKEN.to_string(),
            api_url: format!("http://{}", self.addr),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn failure(status: StatusCode, code: i64, message: String) -> Response {
    let body = json!({
        "success": false,
        "errors": [{"code": code, "message": message}],
        "messages": [],
        "result": null,
    });
    (status, Json(body)).into_response()
}

async fn query(
    State(state): State<FakeState>,
    Path((_account, _database)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<JsonValue>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"));
    if !authorized {
        return failure(
            StatusCode::UNAUTHORIZED,
            10000,
            "Authentication error".to_string(),
        );
    }

    let sql = body["sql"].as_str().unwrap_or_default().to_string();
    let params = body["params"].as_array().cloned().unwrap_or_default();

    let conn = state.conn.lock().unwrap();
    match run(&conn, &sql, &params) {
        Ok(result) => Json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [result],
        }))
        .into_response(),
        Err(e) => failure(StatusCode::BAD_REQUEST, 7500, e.to_string()),
    }
}

fn bind(param: &JsonValue) -> rusqlite::types::Value {
    use rusqlite::types::Value;
    match param {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Integer(i64::from(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or_default()),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

fn to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => json!(f),
        ValueRef::Text(t) => json!(String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => json!(b),
    }
}

fn run(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &[JsonValue],
) -> rusqlite::Result<JsonValue> {
    let mut stmt = conn.prepare(sql)?;
    let values = rusqlite::params_from_iter(params.iter().map(bind));

    if stmt.column_count() > 0 {
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(values)?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut object = serde_json::Map::new();
            for (index, name) in columns.iter().enumerate() {
                object.insert(name.clone(), to_json(row.get_ref(index)?));
            }
            results.push(JsonValue::Object(object));
        }
        return Ok(json!({
            "results": results,
            "success": true,
            "meta": {"changes": 0, "last_row_id": null},
        }));
    }

    let changes = stmt.execute(values)?;
    let is_insert = sql.trim_start().to_ascii_uppercase().starts_with("INSERT");
    let last_row_id = is_insert.then(|| conn.last_insert_rowid());

    Ok(json!({
        "results": [],
        "success": true,
        "meta": {"changes": changes, "last_row_id": last_row_id},
    }))
}
