//! REST-to-RPC translation under the API prefix.
//!
//! # Responsibilities
//! - Map `GET /v1/users/{id}` and `POST /v1/users` onto the upstream methods
//! - Forward inbound HTTP headers as call metadata
//! - Report failures as `{"code", "message", "details"}` with a mapped status
//!
//! # Design Decisions
//! - The prefix is stripped by nesting this router, so routes here are
//!   prefix-free
//! - Header names are already lowercase in `HeaderMap`; repeated headers stay
//!   repeated in the metadata
//! - Hop-by-hop and framing headers are not forwarded: they are illegal or
//!   meaningless on the HTTP/2 upstream call

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tonic::metadata::MetadataMap;
use tonic::{Code, Request};

use crate::http::response::TranslatedError;
use crate::http::server::AppState;
use crate::proto::{CreateUserRequest, GetUserRequest};

const SKIPPED_HEADERS: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
    "te",
    "content-length",
    "content-type",
];

/// Routes served below the API prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/users/{id}", get(get_user))
        .route("/v1/users", post(create_user))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
}

/// Copy forwardable headers into call metadata.
pub fn forward_headers(headers: &HeaderMap) -> MetadataMap {
    let mut forwarded = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if SKIPPED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    MetadataMap::from_headers(forwarded)
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut request = Request::new(GetUserRequest { user_id: id });
    *request.metadata_mut() = forward_headers(&headers);

    match state.upstream.get_user(request).await {
        Ok(user) => Json(user).into_response(),
        Err(status) => TranslatedError::from(status).into_response(),
    }
}

async fn create_user(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let message: CreateUserRequest = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => return TranslatedError::new(Code::InvalidArgument, e.to_string()).into_response(),
    };

    let mut request = Request::new(message);
    *request.metadata_mut() = forward_headers(&headers);

    match state.upstream.create_user(request).await {
        Ok(user) => Json(user).into_response(),
        Err(status) => TranslatedError::from(status).into_response(),
    }
}

async fn not_found() -> TranslatedError {
    TranslatedError::new(Code::NotFound, "Not Found")
}

async fn method_not_allowed() -> TranslatedError {
    TranslatedError::with_status(StatusCode::METHOD_NOT_ALLOWED, Code::Unimplemented, "Method Not Allowed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwards_custom_headers_and_keeps_repeats() {
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant", HeaderValue::from_static("acme"));
        headers.append("x-trace", HeaderValue::from_static("a"));
        headers.append("x-trace", HeaderValue::from_static("b"));
        headers.insert("host", HeaderValue::from_static("gateway:8080"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));

        let metadata = forward_headers(&headers);
        assert_eq!(metadata.get("x-tenant").unwrap().to_str().unwrap(), "acme");

        let traces: Vec<_> = metadata
            .get_all("x-trace")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(traces, vec!["a", "b"]);

        assert!(metadata.get("host").is_none());
        assert!(metadata.get("content-type").is_none());
        assert!(metadata.get("connection").is_none());
    }

    #[test]
    fn header_names_arrive_lowercase() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::HeaderName::from_bytes(b"X-Request-Source").unwrap(),
            HeaderValue::from_static("mobile"),
        );

        let metadata = forward_headers(&headers);
        assert_eq!(
            metadata.get("x-request-source").unwrap().to_str().unwrap(),
            "mobile"
        );
    }
}
