//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Process start:
//!     → logging.rs (tracing subscriber: env filter + fmt/json layer)
//!     → metrics.rs (optional Prometheus exporter)
//!
//! At runtime:
//!     front-ends, interceptors → diagnostics channel → tracing (target "diagnostics")
//!     front-ends, interceptors → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; JSON in production, pretty otherwise
//! - Metric recording is a no-op until an exporter is installed
//! - Request IDs flow to the upstream as call metadata

pub mod logging;
pub mod metrics;
