//! Top-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::net::ListenError;
use crate::upstream::ConnectionError;

/// Reasons the gateway process exits with a failure.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Listen(#[from] ListenError),

    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] std::io::Error),
}
