//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_http_requests_total` (counter): by method, status
//! - `gateway_http_request_duration_seconds` (histogram): by method
//! - `gateway_rpc_calls_total` (counter): by method
//! - `gateway_upstream_calls_total` (counter): by method, code
//! - `gateway_upstream_call_duration_seconds` (histogram): by method
//! - `gateway_diagnostics_overflow_total` (counter)
//!
//! # Design Decisions
//! - Uses the `metrics` facade; without an installed recorder every call is a no-op
//! - Prometheus exporter runs its own HTTP listener when enabled

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_http_request(method: &str, status: u16, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(
        "gateway_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_http_request_duration_seconds", "method" => method.to_string())
        .record(elapsed);
}

pub fn record_rpc_call(method: &str) {
    metrics::counter!("gateway_rpc_calls_total", "method" => method.to_string()).increment(1);
}

pub fn record_upstream_call(method: &str, code: tonic::Code, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    metrics::counter!(
        "gateway_upstream_calls_total",
        "method" => method.to_string(),
        "code" => format!("{:?}", code)
    )
    .increment(1);
    metrics::histogram!("gateway_upstream_call_duration_seconds", "method" => method.to_string())
        .record(elapsed);
}

pub fn record_diagnostics_overflow() {
    metrics::counter!("gateway_diagnostics_overflow_total").increment(1);
}
