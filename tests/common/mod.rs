//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use user_gateway::backend::{self, StaticUserService};
use user_gateway::config::{GatewayConfig, RetryConfig};
use user_gateway::diagnostics::{DiagnosticsChannel, MemorySink};
use user_gateway::lifecycle::{ServerState, ServerStatus};
use user_gateway::{Gateway, GatewayError, Shutdown, ShutdownReport};

/// A reference user service running in-process.
pub struct UserServiceHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    _diagnostics: DiagnosticsChannel,
}

impl UserServiceHandle {
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = self.task.await;
    }
}

/// Start the static user service on `port`, answering after `latency`.
pub async fn start_user_service(port: u16, latency: Duration) -> UserServiceHandle {
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    let diagnostics = DiagnosticsChannel::spawn(1024, Arc::new(MemorySink::new()));
    let service = StaticUserService::new(diagnostics.handle()).with_latency(latency);

    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let _ = backend::serve(listener, service, async {
            let _ = stopped.await;
        })
        .await;
    });

    UserServiceHandle {
        stop: Some(stop),
        task,
        _diagnostics: diagnostics,
    }
}

/// Gateway config on loopback ports with short deadlines.
pub fn gateway_config(http_port: u16, rpc_port: u16, upstream_port: u16) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.http.bind_address = format!("127.0.0.1:{}", http_port);
    config.rpc.bind_address = format!("127.0.0.1:{}", rpc_port);
    config.upstream.address = format!("http://127.0.0.1:{}", upstream_port);
    config.upstream.connect_timeout_secs = 1;
    config.upstream.request_timeout_secs = 5;
    config.upstream.retry = RetryConfig {
        max_attempts: 1,
        ..RetryConfig::default()
    };
    config.shutdown.drain_timeout_secs = 3;
    config.shutdown.overall_timeout_secs = 5;
    config.diagnostics.capacity = 1024;
    config
}

/// A gateway driven by a test-owned signal source.
pub struct RunningGateway {
    pub signals: mpsc::Sender<&'static str>,
    pub shutdown: Shutdown,
    pub http: Arc<ServerStatus>,
    pub rpc: Arc<ServerStatus>,
    pub task: JoinHandle<Result<ShutdownReport, GatewayError>>,
}

impl RunningGateway {
    pub fn http_url(&self, path: &str) -> String {
        let addr = self.http.local_addr().expect("http front-end not listening");
        format!("http://{}{}", addr, path)
    }

    pub fn rpc_url(&self) -> String {
        let addr = self.rpc.local_addr().expect("rpc front-end not listening");
        format!("http://{}", addr)
    }

    /// Deliver a signal and wait for the run to finish.
    pub async fn stop(self, signal: &'static str) -> Result<ShutdownReport, GatewayError> {
        self.signals.send(signal).await.unwrap();
        self.join().await
    }

    pub async fn join(self) -> Result<ShutdownReport, GatewayError> {
        tokio::time::timeout(Duration::from_secs(15), self.task)
            .await
            .expect("gateway did not stop")
            .expect("gateway task panicked")
    }
}

/// Spawn the gateway without waiting for it to listen.
pub fn spawn_gateway(config: GatewayConfig, sink: MemorySink) -> RunningGateway {
    let gateway = Gateway::new(config).with_sink(Arc::new(sink));
    let (signals, rx) = mpsc::channel(4);
    let shutdown = gateway.shutdown_handle();
    let http = gateway.http_status();
    let rpc = gateway.rpc_status();
    let task = tokio::spawn(gateway.run_until(rx));

    RunningGateway {
        signals,
        shutdown,
        http,
        rpc,
        task,
    }
}

/// Spawn the gateway and wait until both front-ends listen.
pub async fn start_gateway(config: GatewayConfig, sink: MemorySink) -> RunningGateway {
    let running = spawn_gateway(config, sink);
    wait_for_state(&running.http, ServerState::Listening).await;
    wait_for_state(&running.rpc, ServerState::Listening).await;
    running
}

pub async fn wait_for_state(status: &ServerStatus, state: ServerState) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while status.state() < state {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("{} never reached {:?}", status.name(), state));
}

pub fn local(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}
