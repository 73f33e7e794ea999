//! Per-request middleware: timing, and JSON bodies for errors raised by the
//! layers and the router rather than by a handler.

use std::sync::Arc;
use std::time::Instant;

use axum::body::{self, Body};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::diagnostics::{Diagnostics, EventKind};
use crate::http::response::{code_for_http, ApiError, TranslatedError};
use crate::lifecycle::ServerStatus;
use crate::observability::metrics;

// Plain-text bodies from the framework are a short reason phrase.
const MAX_ERROR_TEXT: usize = 1024;

/// State for [`request_timing`].
#[derive(Debug, Clone)]
pub struct TimingState {
    pub diagnostics: Diagnostics,
    pub status: Arc<ServerStatus>,
}

/// Holds an in-flight slot for the request and reports method, path, status
/// and duration once the response is produced.
pub async fn request_timing(
    State(state): State<TimingState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let _in_flight = state.status.in_flight().track();
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    metrics::record_http_request(method.as_str(), status, start);
    state.diagnostics.log(
        EventKind::Http,
        format!(
            "HTTP {} {} | Status: {} | Duration: {:?}",
            method,
            path,
            status,
            start.elapsed()
        ),
    );
    response
}

/// State for [`json_errors`]: which paths belong to the translated surface.
#[derive(Debug, Clone)]
pub struct ErrorShape {
    pub api_prefix: Arc<str>,
}

impl ErrorShape {
    fn is_translated(&self, path: &str) -> bool {
        path.strip_prefix(&*self.api_prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// Rewrites non-JSON error responses (body limit, timeout, unknown method or
/// path) into the body shape of the surface the request was aimed at.
/// Headers other than the content ones are kept.
pub async fn json_errors(
    State(shape): State<ErrorShape>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let translated = shape.is_translated(request.uri().path());
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let (parts, original) = response.into_parts();
    let message = match body::to_bytes(original, MAX_ERROR_TEXT).await {
        Ok(text) if !text.is_empty() => String::from_utf8_lossy(&text).trim().to_string(),
        _ => status.canonical_reason().unwrap_or("error").to_string(),
    };

    let rebuilt = if translated {
        TranslatedError::with_status(status, code_for_http(status), message).into_response()
    } else {
        ApiError::new(status, message).into_response()
    };

    let mut headers = parts.headers;
    headers.remove(CONTENT_TYPE);
    headers.remove(CONTENT_LENGTH);
    let (mut rebuilt_parts, rebuilt_body) = rebuilt.into_parts();
    headers.extend(rebuilt_parts.headers.drain());
    rebuilt_parts.headers = headers;
    Response::from_parts(rebuilt_parts, rebuilt_body)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translated_paths_match_whole_segments() {
        let shape = ErrorShape {
            api_prefix: Arc::from("/api"),
        };
        assert!(shape.is_translated("/api"));
        assert!(shape.is_translated("/api/v1/users"));
        assert!(!shape.is_translated("/apis/v1"));
        assert!(!shape.is_translated("/user"));
    }
}
