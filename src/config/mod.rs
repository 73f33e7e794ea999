//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gateway.toml (optional)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, all errors collected)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc with the coordinator and both front-ends
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CredentialsMode, DiagnosticsConfig, GatewayConfig, HttpConfig, LoadBalancing, LogFormat,
    ObservabilityConfig, RetryConfig, RpcConfig, ShutdownConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
