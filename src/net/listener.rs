//! TCP listener binding for the front-ends.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

/// A front-end could not start or stopped serving unexpectedly.
#[derive(Debug, Error)]
pub enum ListenError {
    /// Configured address does not parse.
    #[error("{server} server: invalid bind address '{address}'")]
    InvalidAddress { server: &'static str, address: String },

    /// The OS refused the bind (port in use, permissions).
    #[error("{server} server: failed to listen on {address}: {source}")]
    Bind {
        server: &'static str,
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The serve loop failed after the listener was bound.
    #[error("{server} server error: {reason}")]
    Serve { server: &'static str, reason: String },
}

impl ListenError {
    /// Which front-end failed.
    pub fn server(&self) -> &'static str {
        match self {
            ListenError::InvalidAddress { server, .. }
            | ListenError::Bind { server, .. }
            | ListenError::Serve { server, .. } => server,
        }
    }
}

/// Bind `address` for the named front-end.
pub async fn bind(server: &'static str, address: &str) -> Result<TcpListener, ListenError> {
    let addr: SocketAddr = address.parse().map_err(|_| ListenError::InvalidAddress {
        server,
        address: address.to_string(),
    })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenError::Bind {
            server,
            address: address.to_string(),
            source,
        })?;

    tracing::debug!(server, address = %addr, "Listener bound");
    Ok(listener)
}
