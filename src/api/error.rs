//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::{guard, AuthError, Denial};
use crate::reports::ReportError;
use crate::storage::StorageError;
use crate::uploads::UploadError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// No valid session
    #[error("{message}")]
    Unauthorized {
        message: String,
        redirect: &'static str,
    },

    /// Signed in, but not allowed here
    #[error("{message}")]
    Forbidden {
        message: String,
        redirect: &'static str,
    },

    /// Account exists but an administrator has not approved it yet
    #[error("{0}")]
    PendingApproval(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Unique value already taken
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Report rendering failed
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// The image host failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Service unavailable (dependency down or not configured)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
            redirect: guard::LOGIN_PATH,
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, Option<&'static str>) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", None),
            ApiError::Unauthorized { redirect, .. } => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", Some(*redirect))
            }
            ApiError::Forbidden { redirect, .. } => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", Some(*redirect))
            }
            ApiError::PendingApproval(_) => (
                StatusCode::FORBIDDEN,
                "PENDING_APPROVAL",
                Some(guard::PENDING_APPROVAL_PATH),
            ),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
            ApiError::Conflict(_) | ApiError::Storage(StorageError::Duplicate(_)) => {
                (StatusCode::CONFLICT, "CONFLICT", None)
            }
            ApiError::PayloadTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", None)
            }
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", None),
            ApiError::Report(_) | ApiError::Internal(_) | ApiError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
            }
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", None),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", None)
            }
        }
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => ApiError::unauthorized(denial.message()),
            Denial::WrongRole { .. } => ApiError::Forbidden {
                message: denial.message(),
                redirect: denial.redirect(),
            },
            Denial::PendingApproval => ApiError::PendingApproval(denial.message()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserExists => {
                ApiError::Conflict("An account with this email already exists".to_string())
            }
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::SessionExpired => ApiError::unauthorized(err.to_string()),
            AuthError::AdminOnly => ApiError::Forbidden {
                message: err.to_string(),
                redirect: guard::UNAUTHORIZED_PATH,
            },
            AuthError::Validation(msg) => ApiError::Validation(msg),
            AuthError::PasswordHash(e) => ApiError::Internal(e.to_string()),
            AuthError::Storage(e) => ApiError::Storage(e),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Disabled => ApiError::ServiceUnavailable(err.to_string()),
            UploadError::Empty => ApiError::Validation(err.to_string()),
            UploadError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            UploadError::Request(_) | UploadError::Upstream(_) => {
                ApiError::Upstream(err.to_string())
            }
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Page the client should navigate to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, redirect) = self.parts();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
                redirect: redirect.map(str::to_string),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
