//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::diagnostics::DEFAULT_CAPACITY;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// REST/JSON front-end.
    pub http: HttpConfig,

    /// RPC front-end.
    pub rpc: RpcConfig,

    /// Shared upstream connection.
    pub upstream: UpstreamConfig,

    /// Shutdown deadlines.
    pub shutdown: ShutdownConfig,

    /// Diagnostics channel sizing.
    pub diagnostics: DiagnosticsConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// HTTP front-end configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Total time allowed per request in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Prefix stripped before protocol translation.
    pub api_prefix: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
            api_prefix: "/api".to_string(),
        }
    }
}

/// RPC front-end configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RpcConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// Transport security towards the upstream.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsMode {
    /// Plaintext HTTP/2.
    #[default]
    Insecure,
    /// TLS, verified against `ca_cert_path` when set.
    Tls,
}

/// How calls are spread over upstream endpoints.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancing {
    /// Use `address` only.
    #[default]
    PickFirst,
    /// Rotate over `address` plus `endpoints`.
    RoundRobin,
}

/// Upstream client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Primary upstream URI (e.g., "http://localhost:50052").
    pub address: String,

    /// Additional URIs used by round-robin balancing.
    pub endpoints: Vec<String>,

    /// Transport credentials.
    pub credentials: CredentialsMode,

    /// Server name to verify when `credentials = "tls"`.
    pub tls_domain: Option<String>,

    /// PEM bundle of trusted roots for TLS.
    pub ca_cert_path: Option<String>,

    /// Endpoint selection policy.
    pub load_balancing: LoadBalancing,

    /// Dial timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Per-call timeout in seconds.
    pub request_timeout_secs: u64,

    /// Dial and health-check at startup instead of on first call.
    pub connect_eagerly: bool,

    /// Service name checked through grpc.health.v1 when connecting eagerly.
    pub health_check_service: String,

    /// Retry policy for idempotent calls.
    pub retry: RetryConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost:50052".to_string(),
            endpoints: Vec::new(),
            credentials: CredentialsMode::Insecure,
            tls_domain: None,
            ca_cert_path: None,
            load_balancing: LoadBalancing::PickFirst,
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            connect_eagerly: false,
            health_check_service: crate::proto::SERVICE_NAME.to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl UpstreamConfig {
    /// All endpoints the channel should dial, primary first.
    pub fn all_endpoints(&self) -> Vec<&str> {
        let mut all = vec![self.address.as_str()];
        if self.load_balancing == LoadBalancing::RoundRobin {
            all.extend(self.endpoints.iter().map(String::as_str));
        }
        all
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Shutdown deadlines.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Drain deadline applied by each front-end, in seconds.
    pub drain_timeout_secs: u64,

    /// Upper bound for the whole shutdown sequence, in seconds.
    pub overall_timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 8,
            overall_timeout_secs: 10,
        }
    }
}

impl ShutdownConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_secs(self.overall_timeout_secs)
    }
}

/// Diagnostics channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Pending events held before producers fall back to synchronous emission.
    pub capacity: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
