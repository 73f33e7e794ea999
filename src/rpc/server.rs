//! RPC server setup.
//!
//! # Responsibilities
//! - Bind the RPC listener and serve `user.UserService` plus grpc.health.v1
//! - Time every inbound call and track in-flight calls
//! - Stop accepting on shutdown and drain under the configured deadline

use std::sync::Arc;
use std::time::Duration;

use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use crate::config::RpcConfig;
use crate::diagnostics::{Diagnostics, EventKind};
use crate::lifecycle::{bounded, DrainOutcome, ServerState, ServerStatus, ShutdownSignal};
use crate::net::{self, ListenError};
use crate::proto::user_service_server::UserServiceServer;
use crate::rpc::layer::ServerTimingLayer;
use crate::rpc::service::GatewayService;
use crate::upstream::UpstreamClient;

const NAME: &str = "rpc";

/// The gateway's gRPC front-end.
pub struct RpcServer {
    config: RpcConfig,
    upstream: UpstreamClient,
    diagnostics: Diagnostics,
    status: Arc<ServerStatus>,
}

impl RpcServer {
    pub fn new(
        config: RpcConfig,
        upstream: UpstreamClient,
        diagnostics: Diagnostics,
        status: Arc<ServerStatus>,
    ) -> Self {
        Self {
            config,
            upstream,
            diagnostics,
            status,
        }
    }

    /// Bind and serve until `shutdown` fires, then drain for at most `drain`.
    pub async fn run(self, shutdown: ShutdownSignal, drain: Duration) -> Result<(), ListenError> {
        let result = self.serve(shutdown, drain).await;
        self.status.advance(ServerState::Stopped);
        result
    }

    async fn serve(&self, shutdown: ShutdownSignal, drain: Duration) -> Result<(), ListenError> {
        let listener = net::bind(NAME, &self.config.bind_address).await?;
        let addr = listener.local_addr().map_err(|e| ListenError::Serve {
            server: NAME,
            reason: e.to_string(),
        })?;
        self.status.mark_listening(addr);

        let (mut reporter, health_service) = tonic_health::server::health_reporter();
        reporter
            .set_serving::<UserServiceServer<GatewayService>>()
            .await;

        let service = UserServiceServer::new(GatewayService::new(
            self.upstream.clone(),
            self.diagnostics.clone(),
        ));
        let timing = ServerTimingLayer::new(
            self.diagnostics.clone(),
            self.status.in_flight().clone(),
        );

        tracing::info!(address = %addr, "gRPC server listening");
        self.diagnostics
            .log(EventKind::Lifecycle, format!("gRPC server started on {}", addr));

        let status = Arc::clone(&self.status);
        let stop_accepting = {
            let signal = shutdown.clone();
            async move {
                signal.wait().await;
                status.advance(ServerState::Draining);
                reporter
                    .set_not_serving::<UserServiceServer<GatewayService>>()
                    .await;
                tracing::info!(
                    in_flight = status.in_flight().count(),
                    "gRPC server draining"
                );
            }
        };

        let serve = Server::builder()
            .layer(timing)
            .add_service(health_service)
            .add_service(service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), stop_accepting);

        let outcome = bounded(serve, shutdown, drain)
            .await
            .map_err(|e| ListenError::Serve {
                server: NAME,
                reason: e.to_string(),
            })?;

        if outcome == DrainOutcome::Abandoned {
            self.status.mark_abandoned();
            tracing::warn!(
                in_flight = self.status.in_flight().count(),
                deadline = ?drain,
                "gRPC drain deadline elapsed, abandoning in-flight calls"
            );
        }
        tracing::info!("gRPC server stopped");
        self.diagnostics
            .log(EventKind::Lifecycle, "gRPC server stopped");
        Ok(())
    }
}
