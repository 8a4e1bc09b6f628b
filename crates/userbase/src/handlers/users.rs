use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use userbase_core::{
    schema::{DELETE_USER, INSERT_USER, SELECT_USERS, SELECT_USER_BY_ID, SELECT_USER_ID_BY_EMAIL},
    storage::Value,
    user::{parse_user_id, validate_new_user, User},
};

use super::{AppError, Success};
use crate::state::AppState;

/// Current Beijing time (UTC+8) as `YYYY-MM-DD HH:MM:SS`.
fn beijing_timestamp() -> String {
    (Utc::now().naive_utc() + Duration::hours(8))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// List all users (GET /api/users).
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Success<Vec<User>>>, AppError> {
    let db = state.database().await?;
    let users: Vec<User> = db.prepare(SELECT_USERS).await?.bind(vec![]).all_as().await?;

    tracing::info!(count = users.len(), "Listed users");
    Ok(Json(Success::new(users)))
}

/// Get a single user by ID (GET /api/users/{id}).
pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Success<User>>, AppError> {
    let id = parse_user_id(&raw_id)?;

    let db = state.database().await?;
    let user: Option<User> = db
        .prepare(SELECT_USER_BY_ID)
        .await?
        .bind(vec![Value::Integer(id)])
        .first_as()
        .await?;

    match user {
        Some(user) => {
            tracing::info!(user_id = id, username = %user.username, "Fetched user");
            Ok(Json(Success::new(user)))
        }
        None => Err(AppError::not_found(format!("User with ID {id} not found"))),
    }
}

/// Create a new user (POST /api/users).
///
/// Accepts a JSON body with `username` and `email`. The email pre-check is
/// not atomic with the insert; a concurrent duplicate is still caught by the
/// unique index and reported as a conflict.
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Success<User>>), AppError> {
    let payload: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::bad_request("Request body must be valid JSON"))?;
    let new_user = validate_new_user(&payload)?;

    let db = state.database().await?;

    let existing = db
        .prepare(SELECT_USER_ID_BY_EMAIL)
        .await?
        .bind(vec![Value::from(new_user.email.as_str())])
        .first()
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict("Email is already registered"));
    }

    let outcome = db
        .prepare(INSERT_USER)
        .await?
        .bind(vec![
            Value::from(new_user.username.as_str()),
            Value::from(new_user.email.as_str()),
            Value::from(beijing_timestamp()),
        ])
        .run()
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                AppError::conflict("Username or email already exists")
            } else {
                e.into()
            }
        })?;

    let user = new_user.into_user(outcome.meta.last_row_id);
    tracing::info!(user_id = user.id, username = %user.username, "Created new user");

    Ok((StatusCode::CREATED, Json(Success::new(user))))
}

/// Delete a user by ID (DELETE /api/users/{id}).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Success<()>>, AppError> {
    let id = parse_user_id(&raw_id)?;

    let db = state.database().await?;
    let outcome = db
        .prepare(DELETE_USER)
        .await?
        .bind(vec![Value::Integer(id)])
        .run()
        .await?;

    if outcome.meta.changes == 0 {
        return Err(AppError::not_found(format!("User with ID {id} not found")));
    }

    tracing::info!(user_id = id, "Deleted user");
    Ok(Json(Success::new(())))
}
