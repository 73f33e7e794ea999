//! User gateway library.
//!
//! A REST front-end and a gRPC front-end in one process, both forwarding to a
//! single upstream `user.UserService` through one shared client.

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proto;
pub mod resilience;
pub mod rpc;
pub mod upstream;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use lifecycle::{Gateway, Shutdown, ShutdownReport};
