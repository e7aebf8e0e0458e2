//! API Routes
//!
//! Route handlers organized by functionality.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod intake;
pub mod leads;
pub mod uploads;
pub mod users;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::error::{ApiError, ApiResult};

/// Run CPU-bound work (password hashing) off the async workers
pub(crate) async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Worker task failed: {}", e)))?
}

/// CSV file download
pub(crate) fn csv_attachment(filename: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}
