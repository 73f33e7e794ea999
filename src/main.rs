//! User gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                  GATEWAY                     │
//!   REST client         │  ┌──────────┐                                │
//!   ────────────────────┼─▶│   http   │──┐                             │
//!   :8080               │  │ (axum)   │  │   ┌──────────────────┐      │
//!                       │  └──────────┘  ├──▶│ upstream client  │──────┼──▶ user.UserService
//!   gRPC client         │  ┌──────────┐  │   │ (tonic channel)  │      │    :50052
//!   ────────────────────┼─▶│   rpc    │──┘   └──────────────────┘      │
//!   :8081               │  │ (tonic)  │                                │
//!                       │  └──────────┘                                │
//!                       │                                              │
//!                       │  lifecycle: signals → shutdown → drain       │
//!                       │  diagnostics: bounded queue → tracing        │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use user_gateway::config::{load_config, validate_config, ConfigError, GatewayConfig};
use user_gateway::observability::{logging, metrics};
use user_gateway::{Gateway, GatewayError};

#[derive(Debug, Parser)]
#[command(name = "user-gateway", version, about = "REST and gRPC gateway for user.UserService")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `http.bind_address`.
    #[arg(long)]
    http_addr: Option<String>,

    /// Override `rpc.bind_address`.
    #[arg(long)]
    rpc_addr: Option<String>,

    /// Override `upstream.address`.
    #[arg(long)]
    upstream: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut GatewayConfig) {
        if let Some(addr) = &self.http_addr {
            config.http.bind_address = addr.clone();
        }
        if let Some(addr) = &self.rpc_addr {
            config.rpc.bind_address = addr.clone();
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.address = upstream.clone();
        }
    }

    /// Load the file (if any), apply overrides and validate the result.
    fn load(&self) -> Result<GatewayConfig, GatewayError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GatewayConfig::default(),
        };
        self.apply(&mut config);

        // Overrides are checked again.
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "user-gateway starting");
    tracing::info!(
        http = %config.http.bind_address,
        rpc = %config.rpc.bind_address,
        upstream = %config.upstream.address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match Gateway::new(config).run().await {
        Ok(report) => {
            tracing::info!(
                trigger = %report.trigger,
                timed_out = report.timed_out,
                "Shutdown complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}
