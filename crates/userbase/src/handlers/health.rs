//! Health check endpoints.
//!
//! - `/livez` - Basic liveness check (immediate 200, no checks)
//! - `/healthz` - Which adapter is in use (passive, never resolves one)
//! - `/readyz` - Readiness check (resolves the adapter and pings the database)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use userbase_core::{schema::PING, storage::StorageError};

use crate::state::AppState;

/// GET /livez - Basic liveness check.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Reports the resolved adapter kind.
///
/// Returns `"uninitialized"` until a request has resolved the adapter.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    let adapter = match state.resolved_database() {
        Ok(db) => db.kind().to_string(),
        Err(StorageError::Uninitialized) => "uninitialized".to_string(),
        Err(e) => e.to_string(),
    };

    Json(json!({"status": "ok", "adapter": adapter}))
}

/// GET /readyz - Readiness check.
///
/// Returns 200 when the database answers a trivial query, 503 otherwise.
#[axum::debug_handler]
pub async fn readyz(State(state): State<AppState>) -> Response {
    let ping = async {
        let db = state.database().await?;
        db.prepare(PING).await?.bind(vec![]).first().await?;
        Ok::<_, StorageError>(db.kind())
    };

    match ping.await {
        Ok(kind) => (
            StatusCode::OK,
            Json(json!({"ready": true, "adapter": kind.to_string()})),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"ready": false, "error": e.to_string()})),
            )
                .into_response()
        }
    }
}
