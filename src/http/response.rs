//! Error responses.
//!
//! # Responsibilities
//! - `ApiError`: `{"error": "..."}` bodies for the hand-written routes
//! - `TranslatedError`: `{"code", "message", "details"}` bodies for translated
//!   routes, with the gRPC code mapped onto an HTTP status

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tonic::{Code, Status};

/// Error from a hand-written route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Body could not be decoded. The upstream is not contacted.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Any upstream failure, whatever its code.
    pub fn upstream(status: Status) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: status_message(&status),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Error from a translated route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedError {
    pub code: i32,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    #[serde(skip)]
    status: StatusCode,
}

impl TranslatedError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self::with_status(http_status_for(code), code, message)
    }

    /// Error raised by the HTTP layer itself rather than the upstream, where
    /// the status is already decided.
    pub fn with_status(status: StatusCode, code: Code, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            details: Vec::new(),
            status,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        self.status
    }
}

impl From<Status> for TranslatedError {
    fn from(status: Status) -> Self {
        Self::new(status.code(), status_message(&status))
    }
}

impl IntoResponse for TranslatedError {
    fn into_response(self) -> Response {
        (self.http_status(), Json(self)).into_response()
    }
}

/// HTTP status for a gRPC code, following the usual gateway convention.
pub fn http_status_for(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::Cancelled => StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST),
        Code::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        Code::FailedPrecondition => StatusCode::BAD_REQUEST,
        Code::Aborted => StatusCode::CONFLICT,
        Code::OutOfRange => StatusCode::BAD_REQUEST,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
    }
}

/// gRPC code reported for an HTTP-level failure on a translated route.
pub fn code_for_http(status: StatusCode) -> Code {
    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNSUPPORTED_MEDIA_TYPE
        | StatusCode::UNPROCESSABLE_ENTITY => Code::InvalidArgument,
        StatusCode::UNAUTHORIZED => Code::Unauthenticated,
        StatusCode::FORBIDDEN => Code::PermissionDenied,
        StatusCode::NOT_FOUND => Code::NotFound,
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => Code::Unimplemented,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Code::DeadlineExceeded,
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::TOO_MANY_REQUESTS => Code::ResourceExhausted,
        StatusCode::SERVICE_UNAVAILABLE => Code::Unavailable,
        s if s.is_server_error() => Code::Internal,
        _ => Code::Unknown,
    }
}

// Transport failures can carry an empty message.
fn status_message(status: &Status) -> String {
    if status.message().is_empty() {
        status.code().description().to_string()
    } else {
        status.message().to_string()
    }
}
