//! Log event type.

use std::fmt;

/// Which part of the gateway produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Outbound call to the upstream service (client interceptor).
    UpstreamCall,
    /// Inbound call served by the RPC front-end.
    RpcServer,
    /// Inbound request served by the HTTP front-end.
    Http,
    /// Start/stop/shutdown progress.
    Lifecycle,
    /// Free-form message from a request handler.
    Handler,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UpstreamCall => "upstream_call",
            EventKind::RpcServer => "rpc_server",
            EventKind::Http => "http",
            EventKind::Lifecycle => "lifecycle",
            EventKind::Handler => "handler",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an event reached the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Dequeued by the drain task.
    Queued,
    /// Queue was full; emitted synchronously by the producer.
    Overflow,
    /// Channel was already closed; emitted synchronously by the producer.
    Late,
}

/// An immutable, already formatted diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    kind: EventKind,
    message: String,
}

impl LogEvent {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
