//! Client-side call timing.

use std::future::Future;
use std::time::Instant;

use tonic::{Code, Status};

use crate::diagnostics::{Diagnostics, EventKind};
use crate::observability::metrics;

/// Wraps an upstream call and reports method, duration and outcome.
///
/// The wrapped call's result is returned untouched.
#[derive(Debug, Clone)]
pub struct CallTiming {
    diagnostics: Diagnostics,
}

impl CallTiming {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self { diagnostics }
    }

    pub async fn observe<T, F>(&self, method: &str, call: F) -> Result<T, Status>
    where
        F: Future<Output = Result<T, Status>>,
    {
        let start = Instant::now();
        let result = call.await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                metrics::record_upstream_call(method, Code::Ok, start);
                self.diagnostics.log(
                    EventKind::UpstreamCall,
                    format!("gRPC call succeeded | Method: {} | Duration: {:?}", method, duration),
                );
            }
            Err(status) => {
                metrics::record_upstream_call(method, status.code(), start);
                self.diagnostics.log(
                    EventKind::UpstreamCall,
                    format!(
                        "gRPC call failed | Method: {} | Duration: {:?} | Code: {} | Message: {}",
                        method,
                        duration,
                        status.code() as i32,
                        status.message()
                    ),
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticsChannel, MemorySink};
    use std::sync::Arc;

    #[tokio::test]
    async fn reports_success_and_passes_value_through() {
        let sink = MemorySink::new();
        let channel = DiagnosticsChannel::spawn(8, Arc::new(sink.clone()));
        let timing = CallTiming::new(channel.handle());

        let value = timing
            .observe("/user.UserService/GetUser", async { Ok::<_, Status>(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);

        channel.close().await;
        let events = sink.events_of(EventKind::UpstreamCall);
        assert_eq!(events.len(), 1);
        assert!(events[0]
            .message()
            .starts_with("gRPC call succeeded | Method: /user.UserService/GetUser | Duration: "));
    }

    #[tokio::test]
    async fn reports_failure_without_altering_status() {
        let sink = MemorySink::new();
        let channel = DiagnosticsChannel::spawn(8, Arc::new(sink.clone()));
        let timing = CallTiming::new(channel.handle());

        let err = timing
            .observe("/user.UserService/CreateUser", async {
                Err::<(), _>(Status::not_found("no such user"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
        assert_eq!(err.message(), "no such user");

        channel.close().await;
        let events = sink.events_of(EventKind::UpstreamCall);
        assert_eq!(events.len(), 1);
        let message = events[0].message();
        assert!(message.starts_with("gRPC call failed | Method: /user.UserService/CreateUser"));
        assert!(message.ends_with("| Code: 5 | Message: no such user"));
    }
}
