//! Gateway lifecycle coordinator.
//!
//! # Responsibilities
//! - Own the diagnostics channel, the upstream client and both front-ends
//! - Wait for the first shutdown trigger and broadcast it exactly once
//! - Join the front-ends under the overall deadline, then release resources
//!   in order: diagnostics, then upstream
//!
//! # Data Flow
//! ```text
//! run_until(signals)
//!     → DiagnosticsChannel::spawn
//!     → UpstreamClient::connect          (ConnectionError → exit)
//!     → spawn HttpServer::run, RpcServer::run
//!     → select { signal | front-end error | cancellation }
//!     → Shutdown::trigger
//!     → join front-ends (overall deadline, abort stragglers)
//!     → DiagnosticsChannel::close → drop upstream → ShutdownReport
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::GatewayConfig;
use crate::diagnostics::{DiagnosticsChannel, DrainReport, EventKind, LogSink, TracingSink};
use crate::error::GatewayError;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::lifecycle::state::{ServerState, ServerStatus};
use crate::net::ListenError;
use crate::rpc::RpcServer;
use crate::upstream::UpstreamClient;

/// What started the shutdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// An OS signal, by name.
    Signal(&'static str),
    /// The process-level cancellation handle fired, or the signal source went away.
    Cancelled,
}

impl std::fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownTrigger::Signal(name) => write!(f, "signal {}", name),
            ShutdownTrigger::Cancelled => f.write_str("cancellation"),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    pub trigger: ShutdownTrigger,
    pub http: ServerState,
    pub rpc: ServerState,
    /// The overall deadline elapsed and unfinished front-ends were aborted.
    pub timed_out: bool,
    /// Triggers that arrived once shutdown was already under way.
    pub ignored_triggers: usize,
    pub diagnostics: DrainReport,
}

enum FirstTrigger {
    Shutdown(ShutdownTrigger),
    Failed(ListenError),
}

/// The gateway process: two front-ends over one upstream.
pub struct Gateway {
    config: GatewayConfig,
    sink: Arc<dyn LogSink>,
    shutdown: Shutdown,
    http_status: Arc<ServerStatus>,
    rpc_status: Arc<ServerStatus>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            sink: Arc::new(TracingSink),
            shutdown: Shutdown::new(),
            http_status: Arc::new(ServerStatus::new("http")),
            rpc_status: Arc::new(ServerStatus::new("rpc")),
        }
    }

    /// Replace the diagnostics sink (tests use a `MemorySink`).
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Process-level cancellation: triggering it starts the shutdown sequence.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn http_status(&self) -> Arc<ServerStatus> {
        Arc::clone(&self.http_status)
    }

    pub fn rpc_status(&self) -> Arc<ServerStatus> {
        Arc::clone(&self.rpc_status)
    }

    /// Run until SIGINT/SIGTERM, a front-end failure, or cancellation.
    pub async fn run(self) -> Result<ShutdownReport, GatewayError> {
        let (signals, listener) = signals::listen().map_err(GatewayError::Signal)?;
        let result = self.run_until(signals).await;
        listener.abort();
        let _ = listener.await;
        result
    }

    /// Like [`run`](Self::run) with an explicit signal source.
    pub async fn run_until(
        self,
        mut signals: mpsc::Receiver<&'static str>,
    ) -> Result<ShutdownReport, GatewayError> {
        let Gateway {
            config,
            sink,
            shutdown,
            http_status,
            rpc_status,
        } = self;

        let channel = DiagnosticsChannel::spawn(config.diagnostics.capacity, sink);
        let diagnostics = channel.handle();

        let upstream = match UpstreamClient::connect(&config.upstream, diagnostics.clone()).await {
            Ok(upstream) => upstream,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create upstream client");
                http_status.advance(ServerState::Stopped);
                rpc_status.advance(ServerState::Stopped);
                drop(diagnostics);
                channel.close().await;
                return Err(e.into());
            }
        };
        diagnostics.log(
            EventKind::Lifecycle,
            format!("Connected to upstream at {}", upstream.target()),
        );

        let drain = config.shutdown.drain_timeout();
        let (errors_tx, mut errors) = mpsc::channel::<ListenError>(2);
        let mut servers = JoinSet::new();

        let http = HttpServer::new(
            config.http.clone(),
            upstream.clone(),
            diagnostics.clone(),
            Arc::clone(&http_status),
        );
        let signal = shutdown.subscribe();
        let tx = errors_tx.clone();
        servers.spawn(async move {
            if let Err(e) = http.run(signal, drain).await {
                let _ = tx.send(e).await;
            }
        });

        let rpc = RpcServer::new(
            config.rpc.clone(),
            upstream.clone(),
            diagnostics.clone(),
            Arc::clone(&rpc_status),
        );
        let signal = shutdown.subscribe();
        let tx = errors_tx;
        servers.spawn(async move {
            if let Err(e) = rpc.run(signal, drain).await {
                let _ = tx.send(e).await;
            }
        });

        let mut cancelled = shutdown.subscribe();
        let first = tokio::select! {
            signal = signals.recv() => FirstTrigger::Shutdown(match signal {
                Some(name) => ShutdownTrigger::Signal(name),
                None => ShutdownTrigger::Cancelled,
            }),
            Some(err) = errors.recv() => FirstTrigger::Failed(err),
            _ = cancelled.recv() => FirstTrigger::Shutdown(ShutdownTrigger::Cancelled),
        };

        match &first {
            FirstTrigger::Shutdown(trigger) => {
                tracing::info!(trigger = %trigger, "Shutting down");
                diagnostics.log(
                    EventKind::Lifecycle,
                    format!("Received {}, shutting down servers...", trigger),
                );
            }
            FirstTrigger::Failed(err) => {
                tracing::error!(error = %err, server = err.server(), "Front-end failed, shutting down");
                diagnostics.log(EventKind::Lifecycle, format!("Server error: {}", err));
            }
        }
        shutdown.trigger();

        let deadline = tokio::time::sleep(config.shutdown.overall_timeout());
        tokio::pin!(deadline);
        let mut timed_out = false;
        let mut ignored_triggers = 0;
        let mut signals_open = true;

        loop {
            tokio::select! {
                joined = servers.join_next() => match joined {
                    Some(Err(e)) if e.is_panic() => {
                        tracing::error!(error = %e, "Front-end task panicked");
                    }
                    Some(_) => {}
                    None => break,
                },
                _ = &mut deadline => {
                    timed_out = true;
                    tracing::warn!(
                        deadline = ?config.shutdown.overall_timeout(),
                        remaining = servers.len(),
                        "Shutdown deadline elapsed, aborting remaining front-ends"
                    );
                    servers.abort_all();
                    while servers.join_next().await.is_some() {}
                    http_status.advance(ServerState::Stopped);
                    rpc_status.advance(ServerState::Stopped);
                    break;
                }
                signal = signals.recv(), if signals_open => match signal {
                    Some(name) => {
                        ignored_triggers += 1;
                        tracing::info!(signal = name, "Shutdown already in progress, ignoring signal");
                    }
                    None => signals_open = false,
                },
                Some(err) = errors.recv() => {
                    ignored_triggers += 1;
                    tracing::warn!(error = %err, "Front-end failed during shutdown");
                }
            }
        }

        if timed_out {
            diagnostics.log(EventKind::Lifecycle, "Service shutdown timeout");
        } else {
            diagnostics.log(EventKind::Lifecycle, "All services stopped safely");
        }

        drop(diagnostics);
        let drained = channel.close().await;
        drop(upstream);

        tracing::info!(
            drained = drained.drained,
            overflowed = drained.overflowed,
            late = drained.late,
            timed_out,
            "Gateway stopped"
        );

        match first {
            FirstTrigger::Failed(err) => Err(err.into()),
            FirstTrigger::Shutdown(trigger) => Ok(ShutdownReport {
                trigger,
                http: http_status.state(),
                rpc: rpc_status.state(),
                timed_out,
                ignored_triggers,
                diagnostics: drained,
            }),
        }
    }
}
