//! Reference upstream: a static `user.UserService`.
//!
//! Serves fixed data so the gateway can be exercised end to end without a
//! real user store. Used by the `user-service` binary and the integration
//! tests.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

use crate::diagnostics::{Diagnostics, EventKind};
use crate::net::InFlightTracker;
use crate::proto::user_service_server::{UserService, UserServiceServer};
use crate::proto::{CreateUserRequest, CreateUserResponse, GetUserRequest, GetUserResponse};
use crate::rpc::ServerTimingLayer;

/// ID assigned to every created user.
pub const CREATED_USER_ID: &str = "123";

/// Answers every lookup with the same user.
#[derive(Debug, Clone)]
pub struct StaticUserService {
    diagnostics: Diagnostics,
    latency: Duration,
}

impl StaticUserService {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            latency: Duration::ZERO,
        }
    }

    /// Delay every response, to hold calls in flight.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_work(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[tonic::async_trait]
impl UserService for StaticUserService {
    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        let request = request.into_inner();
        self.diagnostics.log(
            EventKind::Handler,
            format!("Received GetUser request for ID: {}", request.user_id),
        );
        self.simulate_work().await;

        Ok(Response::new(GetUserResponse {
            id: request.user_id,
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
        }))
    }

    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        let request = request.into_inner();
        self.diagnostics.log(
            EventKind::Handler,
            format!("Received CreateUser request: {}, {}", request.name, request.email),
        );
        self.simulate_work().await;

        Ok(Response::new(CreateUserResponse {
            id: CREATED_USER_ID.to_string(),
            name: request.name,
            email: request.email,
        }))
    }
}

/// Serve `service` and grpc.health.v1 on `listener` until `signal` resolves.
///
/// In-flight calls finish before this returns.
pub async fn serve<F>(
    listener: TcpListener,
    service: StaticUserService,
    signal: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()>,
{
    let (mut reporter, health_service) = tonic_health::server::health_reporter();
    reporter
        .set_serving::<UserServiceServer<StaticUserService>>()
        .await;

    let timing = ServerTimingLayer::new(service.diagnostics.clone(), InFlightTracker::new());

    Server::builder()
        .layer(timing)
        .add_service(health_service)
        .add_service(UserServiceServer::new(service))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
        .await
}
