//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the hand-written and translated routes
//! - Wire up middleware (tracing, timeout, body limit, request ID, timing)
//! - Give every error response a JSON body, including the ones produced by
//!   layers and the router
//! - Bind the listener and serve until shutdown
//! - Drain in-flight requests under the configured deadline

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::diagnostics::{Diagnostics, EventKind};
use crate::http::handlers;
use crate::http::middleware::{json_errors, request_timing, ErrorShape, TimingState};
use crate::http::request::MakeRequestUuid;
use crate::http::translate;
use crate::lifecycle::{bounded, DrainOutcome, ServerState, ServerStatus, ShutdownSignal};
use crate::net::{self, ListenError};
use crate::upstream::UpstreamClient;

const NAME: &str = "http";

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub diagnostics: Diagnostics,
}

/// The gateway's REST front-end.
pub struct HttpServer {
    config: HttpConfig,
    state: AppState,
    status: Arc<ServerStatus>,
}

impl HttpServer {
    pub fn new(
        config: HttpConfig,
        upstream: UpstreamClient,
        diagnostics: Diagnostics,
        status: Arc<ServerStatus>,
    ) -> Self {
        Self {
            config,
            state: AppState {
                upstream,
                diagnostics,
            },
            status,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let timing = TimingState {
            diagnostics: self.state.diagnostics.clone(),
            status: Arc::clone(&self.status),
        };
        let shape = ErrorShape {
            api_prefix: Arc::from(self.config.api_prefix.as_str()),
        };

        Router::new()
            .route("/health", get(handlers::health))
            .route("/user/{id}", get(handlers::get_user))
            .route("/user", post(handlers::create_user))
            .method_not_allowed_fallback(handlers::method_not_allowed)
            .nest(&self.config.api_prefix, translate::router())
            .with_state(self.state.clone())
            .layer(middleware::from_fn_with_state(timing, request_timing))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_secs,
            )))
            .layer(RequestBodyLimitLayer::new(self.config.max_body_bytes))
            .layer(middleware::from_fn_with_state(shape, json_errors))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
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

        tracing::info!(address = %addr, "HTTP server listening");
        self.state
            .diagnostics
            .log(EventKind::Lifecycle, format!("HTTP server started on {}", addr));

        let status = Arc::clone(&self.status);
        let stop_accepting = {
            let signal = shutdown.clone();
            async move {
                signal.wait().await;
                status.advance(ServerState::Draining);
                tracing::info!(
                    in_flight = status.in_flight().count(),
                    "HTTP server draining"
                );
            }
        };

        let serve = axum::serve(listener, self.router())
            .with_graceful_shutdown(stop_accepting)
            .into_future();

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
                "HTTP drain deadline elapsed, abandoning in-flight requests"
            );
        }
        tracing::info!("HTTP server stopped");
        self.state
            .diagnostics
            .log(EventKind::Lifecycle, "HTTP server stopped");
        Ok(())
    }
}
