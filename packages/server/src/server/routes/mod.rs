// HTTP routes
pub mod health;
pub mod jobs;

pub use health::*;
pub use jobs::*;

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Error body shared by every route.
#[derive(Debug, Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
