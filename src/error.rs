use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use store::StoreError;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Error returned by handlers, rendered as an [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_FIELD", message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername(_) => {
                Self::new(StatusCode::CONFLICT, "USERNAME_ALREADY_EXISTS", err.to_string())
            }
            StoreError::AuthFailure => {
                Self::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", err.to_string())
            }
            StoreError::NotFound { .. } => Self::not_found(err.to_string()),
            StoreError::Forbidden(_) => {
                Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string())
            }
            StoreError::InvalidContent => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_CONTENT", err.to_string())
            }
            StoreError::InvalidField { .. } => Self::invalid_field(err.to_string()),
            StoreError::Database(ref db_error) => {
                error!("Database failure: {}", db_error);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Internal server error",
                )
            }
            StoreError::Credential(ref reason) => {
                error!("Credential hashing failure: {}", reason);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CREDENTIAL_ERROR",
                    "Internal server error",
                )
            }
            StoreError::Storage(ref io_error) => {
                error!("Artwork storage failure: {}", io_error);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Failed to store image",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
            success: false,
        };
        (self.status, Json(body)).into_response()
    }
}
