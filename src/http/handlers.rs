//! Hand-written REST routes.
//!
//! Bodies are decoded here rather than by the `Json` extractor so that a
//! malformed body always yields `400 {"error": ...}` without an upstream call.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tonic::Request;

use crate::diagnostics::EventKind;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::proto::{CreateUserRequest, CreateUserResponse, GetUserRequest, GetUserResponse};

/// Liveness check. Never touches the upstream.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Known path, unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GetUserResponse>, ApiError> {
    state
        .diagnostics
        .log(EventKind::Handler, format!("[HTTP] GetUser request for ID: {}", id));

    let user = state
        .upstream
        .get_user(Request::new(GetUserRequest { user_id: id }))
        .await
        .map_err(ApiError::upstream)?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateUserResponse>, ApiError> {
    let request: CreateUserRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {}", e)))?;

    state.diagnostics.log(
        EventKind::Handler,
        format!("[HTTP] CreateUser request: {}, {}", request.name, request.email),
    );

    let user = state
        .upstream
        .create_user(Request::new(request))
        .await
        .map_err(ApiError::upstream)?;
    Ok(Json(user))
}
