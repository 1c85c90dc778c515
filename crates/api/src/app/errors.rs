//! Error → HTTP response mapping.
//!
//! Every error body has the shape
//! `{ "error": <code>, "message": <text>, "details"?: [{ field, message }] }`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use rigshop_core::{DomainError, FieldViolation};
use rigshop_infra::{AccountError, CatalogError, StoreError, UploadError};

#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    Upload(UploadError),
    /// Malformed request body or form.
    BadRequest { status: StatusCode, message: String },
    Unauthorized(String),
    /// Storage or runtime failure; details are logged, not returned.
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::Upload(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(d) => ApiError::Domain(d),
            backend @ StoreError::Backend { .. } => ApiError::Internal(backend.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Store(e) => e.into(),
            CatalogError::Upload(e) => e.into(),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Store(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain(DomainError::Validation(violations)) => {
                let message = violations
                    .iter()
                    .map(FieldViolation::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                json_error_with_details(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    message,
                    &violations,
                )
            }
            ApiError::Domain(e @ DomainError::NotFound { .. }) => {
                json_error(StatusCode::NOT_FOUND, "not_found", e.to_string())
            }
            ApiError::Domain(DomainError::Conflict(msg)) => {
                json_error(StatusCode::CONFLICT, "conflict", msg)
            }
            ApiError::Domain(DomainError::Unauthorized) => {
                json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid email or password")
            }
            ApiError::Domain(e @ DomainError::InvalidId(_)) => {
                json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string())
            }
            ApiError::Upload(e @ UploadError::InvalidFileType(_)) => {
                json_error(StatusCode::BAD_REQUEST, "invalid_file_type", e.to_string())
            }
            ApiError::Upload(e @ UploadError::FileTooLarge { .. }) => {
                json_error(StatusCode::PAYLOAD_TOO_LARGE, "file_too_large", e.to_string())
            }
            ApiError::Upload(e @ UploadError::Io(_)) => {
                error!(error = %e, "upload storage failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "failed to store upload",
                )
            }
            ApiError::BadRequest { status, message } => json_error(status, "bad_request", message),
            ApiError::Unauthorized(msg) => {
                json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg)
            }
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn json_error_with_details(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    details: &[FieldViolation],
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
            "details": details,
        })),
    )
        .into_response()
}
