//! HTTP front-end subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers, bounded drain)
//!     → request.rs (x-request-id assigned and echoed)
//!     → middleware.rs (in-flight guard, one event per request)
//!     → handlers.rs  /health, /user/{id}, /user        (hand-written mapping)
//!     → translate.rs /api/... with the prefix stripped (generated-style mapping)
//!     → upstream::UpstreamClient
//!     → response.rs (error bodies and status mapping)
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod translate;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{ApiError, TranslatedError};
pub use server::{AppState, HttpServer};
