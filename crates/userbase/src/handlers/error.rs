use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use userbase_core::storage::{storage_error_to_status_code, StorageError};
use userbase_core::user::UserValidationError;

/// Handler error.
///
/// `Fail` is an expected, client-visible outcome with its own status.
/// Anything else converts into `Internal` through `?`; storage and
/// validation errors carried inside still pick their status code.
pub enum AppError {
    Fail { status: StatusCode, message: String },
    Internal(anyhow::Error),
}

impl AppError {
    pub fn fail(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Fail {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::fail(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::fail(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::fail(StatusCode::CONFLICT, message)
    }
}

fn fail_response(status: StatusCode, message: String) -> Response {
    tracing::warn!(%status, %message, "Request failed");
    (status, Json(json!({"status": "fail", "message": message}))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = match self {
            AppError::Fail { status, message } => return fail_response(status, message),
            AppError::Internal(err) => err,
        };

        if let Some(validation) = err.downcast_ref::<UserValidationError>() {
            return fail_response(StatusCode::BAD_REQUEST, validation.to_string());
        }

        let status = err
            .downcast_ref::<StorageError>()
            .map(|storage| {
                StatusCode::from_u16(storage_error_to_status_code(storage))
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            })
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(%status, error = %err, "Request error");
            return (
                status,
                Json(json!({"status": "error", "message": "Internal server error"})),
            )
                .into_response();
        }

        fail_response(status, err.to_string())
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
