pub mod error;
pub mod health;
pub mod users;

use serde::Serialize;

pub use error::AppError;

/// Success envelope: `{"status": "success", "data": ...}`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    status: &'static str,
    data: T,
}

impl<T> Success<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
