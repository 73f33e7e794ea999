//! End-to-end request tests through both front-ends.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use user_gateway::diagnostics::{EventKind, MemorySink};
use user_gateway::proto::user_service_client::UserServiceClient;
use user_gateway::proto::{CreateUserRequest, GetUserRequest};

mod common;

#[tokio::test]
async fn health_answers_while_upstream_is_down() {
    // Nothing listens on the upstream port.
    let gateway = common::start_gateway(common::gateway_config(29101, 29102, 29103), MemorySink::new()).await;

    let response = reqwest::get(gateway.http_url("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "healthy" }));

    gateway.stop("SIGTERM").await.unwrap();
}

#[tokio::test]
async fn create_user_over_rest() {
    let upstream = common::start_user_service(29113, Duration::ZERO).await;
    let gateway = common::start_gateway(common::gateway_config(29111, 29112, 29113), MemorySink::new()).await;

    let response = reqwest::Client::new()
        .post(gateway.http_url("/user"))
        .json(&json!({ "name": "Ada", "email": "ada@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "id": "123", "name": "Ada", "email": "ada@x.com" }));

    gateway.stop("SIGTERM").await.unwrap();
    upstream.stop().await;
}

#[tokio::test]
async fn get_user_over_rest() {
    let upstream = common::start_user_service(29123, Duration::ZERO).await;
    let sink = MemorySink::new();
    let gateway = common::start_gateway(common::gateway_config(29121, 29122, 29123), sink.clone()).await;

    let response = reqwest::get(gateway.http_url("/user/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "id": "42", "name": "John Doe", "email": "john@example.com" }));

    gateway.stop("SIGTERM").await.unwrap();
    upstream.stop().await;

    let calls = sink.events_of(EventKind::UpstreamCall);
    assert_eq!(calls.len(), 1);
    assert!(calls[0]
        .message()
        .starts_with("gRPC call succeeded | Method: /user.UserService/GetUser | Duration: "));
    assert!(sink
        .events_of(EventKind::Http)
        .iter()
        .any(|e| e.message().starts_with("HTTP GET /user/42 | Status: 200")));
}

#[tokio::test]
async fn malformed_body_is_400_without_upstream_call() {
    let upstream = common::start_user_service(29133, Duration::ZERO).await;
    let sink = MemorySink::new();
    let gateway = common::start_gateway(common::gateway_config(29131, 29132, 29133), sink.clone()).await;

    let response = reqwest::Client::new()
        .post(gateway.http_url("/user"))
        .header("content-type", "application/json")
        .body("this is not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    gateway.stop("SIGTERM").await.unwrap();
    upstream.stop().await;

    assert!(sink.events_of(EventKind::UpstreamCall).is_empty());
}

#[tokio::test]
async fn unreachable_upstream_is_500() {
    let gateway = common::start_gateway(common::gateway_config(29141, 29142, 29143), MemorySink::new()).await;

    let response = reqwest::get(gateway.http_url("/user/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert!(!body["error"].as_str().unwrap().is_empty());

    gateway.stop("SIGTERM").await.unwrap();
}

#[tokio::test]
async fn rpc_front_end_passes_calls_through() {
    let upstream = common::start_user_service(29153, Duration::ZERO).await;
    let sink = MemorySink::new();
    let gateway = common::start_gateway(common::gateway_config(29151, 29152, 29153), sink.clone()).await;

    let mut client = UserServiceClient::connect(gateway.rpc_url()).await.unwrap();
    let user = client
        .get_user(GetUserRequest {
            user_id: "7".into(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(user.id, "7");
    assert_eq!(user.name, "John Doe");

    let created = client
        .create_user(CreateUserRequest {
            name: "Grace".into(),
            email: "grace@x.com".into(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(created.id, "123");
    assert_eq!(created.email, "grace@x.com");

    drop(client);
    gateway.stop("SIGTERM").await.unwrap();
    upstream.stop().await;

    let server_events = sink.events_of(EventKind::RpcServer);
    assert!(server_events
        .iter()
        .any(|e| e.message().contains("Method: /user.UserService/GetUser")));
    assert!(sink
        .events_of(EventKind::Handler)
        .iter()
        .any(|e| e.message().starts_with("[Gateway] Processing gRPC request GetUser")));
}

#[tokio::test]
async fn rpc_front_end_forwards_upstream_errors_unchanged() {
    let gateway = common::start_gateway(common::gateway_config(29161, 29162, 29163), MemorySink::new()).await;

    let mut client = UserServiceClient::connect(gateway.rpc_url()).await.unwrap();
    let status = client
        .get_user(GetUserRequest {
            user_id: "7".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::Unavailable);

    drop(client);
    gateway.stop("SIGTERM").await.unwrap();
}

#[tokio::test]
async fn rpc_health_reports_serving() {
    use tonic_health::pb::health_check_response::ServingStatus;
    use tonic_health::pb::health_client::HealthClient;
    use tonic_health::pb::HealthCheckRequest;

    let sink = MemorySink::new();
    let gateway = common::start_gateway(common::gateway_config(29171, 29172, 29173), sink.clone()).await;

    let channel = tonic::transport::Channel::from_shared(gateway.rpc_url())
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut health = HealthClient::new(channel);
    let response = health
        .check(HealthCheckRequest {
            service: "user.UserService".into(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(response.status, ServingStatus::Serving as i32);

    drop(health);
    gateway.stop("SIGTERM").await.unwrap();
    assert!(sink.events_of(EventKind::RpcServer).is_empty());
}

#[tokio::test]
async fn translated_routes_reach_upstream() {
    let upstream = common::start_user_service(29183, Duration::ZERO).await;
    let gateway = common::start_gateway(common::gateway_config(29181, 29182, 29183), MemorySink::new()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(gateway.http_url("/api/v1/users/9"))
        .header("x-tenant", "acme")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], "9");

    let response = client
        .post(gateway.http_url("/api/v1/users"))
        .json(&json!({ "name": "Ada", "email": "ada@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], "123");

    let response = client
        .get(gateway.http_url("/api/v1/nothing"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    gateway.stop("SIGTERM").await.unwrap();
    upstream.stop().await;
}

#[tokio::test]
async fn translated_errors_carry_grpc_code() {
    let gateway = common::start_gateway(common::gateway_config(29191, 29192, 29193), MemorySink::new()).await;

    let response = reqwest::get(gateway.http_url("/api/v1/users/9")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 14);
    assert!(body["message"].is_string());
    assert_eq!(body["details"], json!([]));

    gateway.stop("SIGTERM").await.unwrap();
}
