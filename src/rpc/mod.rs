//! RPC front-end subsystem.
//!
//! # Data Flow
//! ```text
//! gRPC client
//!     → server.rs (tonic Server, health service, bounded drain)
//!     → layer.rs (ServerTiming: in-flight guard + one event per call)
//!     → service.rs (GatewayService: forward to the shared upstream client)
//!     → upstream::UpstreamClient
//! ```
//!
//! # Design Decisions
//! - Pure passthrough: requests, responses and status codes are forwarded as-is
//! - The health service flips to NOT_SERVING as soon as drain begins

pub mod layer;
pub mod server;
pub mod service;

pub use layer::{ServerTiming, ServerTimingLayer};
pub use server::RpcServer;
pub use service::GatewayService;
