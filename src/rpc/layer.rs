//! Server-side timing for inbound RPCs.

use std::task::{Context, Poll};
use std::time::Instant;

use futures_util::future::BoxFuture;
use tonic::codegen::http;
use tower::{Layer, Service};

use crate::diagnostics::{Diagnostics, EventKind};
use crate::net::InFlightTracker;
use crate::observability::metrics;
use crate::proto::METHOD_PREFIX;

/// Tower layer producing [`ServerTiming`].
#[derive(Debug, Clone)]
pub struct ServerTimingLayer {
    diagnostics: Diagnostics,
    in_flight: InFlightTracker,
}

impl ServerTimingLayer {
    pub fn new(diagnostics: Diagnostics, in_flight: InFlightTracker) -> Self {
        Self {
            diagnostics,
            in_flight,
        }
    }
}

impl<S> Layer<S> for ServerTimingLayer {
    type Service = ServerTiming<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ServerTiming {
            inner,
            diagnostics: self.diagnostics.clone(),
            in_flight: self.in_flight.clone(),
        }
    }
}

/// Records the method and handler duration of every `user.UserService` call
/// after it returns. Other services on the same server (health) pass through.
#[derive(Debug, Clone)]
pub struct ServerTiming<S> {
    inner: S,
    diagnostics: Diagnostics,
    in_flight: InFlightTracker,
}

impl<S, B> Service<http::Request<B>> for ServerTiming<S>
where
    S: Service<http::Request<B>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<S::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        if !request.uri().path().starts_with(METHOD_PREFIX) {
            return Box::pin(self.inner.call(request));
        }

        let method = request.uri().path().to_string();
        let guard = self.in_flight.track();
        let diagnostics = self.diagnostics.clone();
        let start = Instant::now();
        let response = self.inner.call(request);

        Box::pin(async move {
            let result = response.await;
            metrics::record_rpc_call(&method);
            diagnostics.log(
                EventKind::RpcServer,
                format!(
                    "gRPC server processing completed | Method: {} | Duration: {:?}",
                    method,
                    start.elapsed()
                ),
            );
            drop(guard);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticsChannel, MemorySink};
    use std::convert::Infallible;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn logs_method_after_handler_returns() {
        let sink = MemorySink::new();
        let channel = DiagnosticsChannel::spawn(8, Arc::new(sink.clone()));
        let in_flight = InFlightTracker::new();

        let observed = in_flight.clone();
        let inner = tower::service_fn(move |_req: http::Request<()>| {
            let during = observed.count();
            async move { Ok::<_, Infallible>(during) }
        });
        let service = ServerTimingLayer::new(channel.handle(), in_flight.clone()).layer(inner);

        let request = http::Request::builder()
            .uri("/user.UserService/GetUser")
            .body(())
            .unwrap();
        let during = service.oneshot(request).await.unwrap();
        assert_eq!(during, 1);
        assert_eq!(in_flight.count(), 0);

        channel.close().await;
        let events = sink.events_of(EventKind::RpcServer);
        assert_eq!(events.len(), 1);
        assert!(events[0]
            .message()
            .starts_with("gRPC server processing completed | Method: /user.UserService/GetUser | Duration: "));
    }

    #[tokio::test]
    async fn health_checks_are_not_timed() {
        let sink = MemorySink::new();
        let channel = DiagnosticsChannel::spawn(8, Arc::new(sink.clone()));
        let in_flight = InFlightTracker::new();

        let observed = in_flight.clone();
        let inner = tower::service_fn(move |_req: http::Request<()>| {
            let during = observed.count();
            async move { Ok::<_, Infallible>(during) }
        });
        let service = ServerTimingLayer::new(channel.handle(), in_flight.clone()).layer(inner);

        let request = http::Request::builder()
            .uri("/grpc.health.v1.Health/Check")
            .body(())
            .unwrap();
        let during = service.oneshot(request).await.unwrap();
        assert_eq!(during, 0);

        channel.close().await;
        assert!(sink.events_of(EventKind::RpcServer).is_empty());
    }
}
