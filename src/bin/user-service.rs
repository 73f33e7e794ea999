//! Reference user service.
//!
//! Serves `user.UserService` with static data on a single gRPC port, for
//! running the gateway locally.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use user_gateway::backend::{self, StaticUserService};
use user_gateway::config::ObservabilityConfig;
use user_gateway::diagnostics::{DiagnosticsChannel, TracingSink, DEFAULT_CAPACITY};
use user_gateway::lifecycle::signals;
use user_gateway::net;
use user_gateway::observability::logging;

#[derive(Debug, Parser)]
#[command(name = "user-service", version, about = "Static user.UserService for local testing")]
struct Args {
    /// gRPC listen address.
    #[arg(long, default_value = "0.0.0.0:50052")]
    addr: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Delay every response by this many milliseconds.
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let observability = ObservabilityConfig {
        log_level: args.log_level.clone(),
        ..ObservabilityConfig::default()
    };
    if let Err(e) = logging::init(&observability) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let listener = match net::bind("rpc", &args.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen");
            return ExitCode::FAILURE;
        }
    };
    let (mut signals, signal_task) = match signals::listen() {
        Ok(listening) => listening,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handlers");
            return ExitCode::FAILURE;
        }
    };

    let channel = DiagnosticsChannel::spawn(DEFAULT_CAPACITY, Arc::new(TracingSink));
    let service = StaticUserService::new(channel.handle())
        .with_latency(std::time::Duration::from_millis(args.latency_ms));

    tracing::info!(address = %args.addr, "User service listening");
    let stop = async move {
        if let Some(name) = signals.recv().await {
            tracing::info!(signal = name, "Shutting down user service");
        }
    };

    let result = backend::serve(listener, service, stop).await;
    signal_task.abort();

    let drained = channel.close().await;
    tracing::info!(drained = drained.drained, "User service stopped");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "User service failed");
            ExitCode::FAILURE
        }
    }
}
