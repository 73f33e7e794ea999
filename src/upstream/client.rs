//! Upstream client handle.
//!
//! # Responsibilities
//! - Build the tonic channel (credentials, timeouts, balancing)
//! - Optionally dial and health-check the upstream at startup
//! - Expose GetUser/CreateUser with timing and retry applied

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::{Code, Request, Response, Status};
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

use crate::config::{CredentialsMode, RetryConfig, UpstreamConfig};
use crate::diagnostics::Diagnostics;
use crate::proto::user_service_client::UserServiceClient;
use crate::proto::{CreateUserRequest, CreateUserResponse, GetUserRequest, GetUserResponse};
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::retries::is_retryable;
use crate::upstream::interceptor::CallTiming;
use crate::upstream::UpstreamMethod;

/// Failure to establish the upstream handle. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("invalid upstream address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("upstream TLS configuration failed: {0}")]
    Tls(String),

    #[error("failed to connect to upstream {address}: {reason}")]
    Connect { address: String, reason: String },
}

/// Shared, cloneable handle to the upstream user service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: UserServiceClient<Channel>,
    channel: Channel,
    timing: CallTiming,
    retry: RetryConfig,
    target: String,
}

impl UpstreamClient {
    /// Build the handle from configuration.
    ///
    /// Lazy by default: the channel dials on first use. With
    /// `connect_eagerly` the upstream must be reachable now.
    pub async fn connect(
        config: &UpstreamConfig,
        diagnostics: Diagnostics,
    ) -> Result<Self, ConnectionError> {
        let mut endpoints = config
            .all_endpoints()
            .into_iter()
            .map(|address| build_endpoint(address, config))
            .collect::<Result<Vec<_>, _>>()?;

        let channel = if endpoints.len() > 1 {
            Channel::balance_list(endpoints.into_iter())
        } else {
            let endpoint = endpoints.remove(0);
            if config.connect_eagerly {
                endpoint
                    .connect()
                    .await
                    .map_err(|e| ConnectionError::Connect {
                        address: config.address.clone(),
                        reason: e.to_string(),
                    })?
            } else {
                endpoint.connect_lazy()
            }
        };

        let upstream = Self {
            client: UserServiceClient::new(channel.clone()),
            channel,
            timing: CallTiming::new(diagnostics),
            retry: config.retry.clone(),
            target: config.address.clone(),
        };

        if config.connect_eagerly {
            upstream.check_health(&config.health_check_service).await?;
        }

        tracing::info!(
            target_address = %upstream.target,
            credentials = ?config.credentials,
            load_balancing = ?config.load_balancing,
            eager = config.connect_eagerly,
            "Upstream client ready"
        );
        Ok(upstream)
    }

    /// Primary upstream address.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Ask the upstream's grpc.health.v1 service about `service`.
    ///
    /// Only a transport failure is an error; a missing health service or a
    /// non-serving status is logged and tolerated.
    async fn check_health(&self, service: &str) -> Result<(), ConnectionError> {
        let mut health = HealthClient::new(self.channel.clone());
        let request = HealthCheckRequest {
            service: service.to_string(),
        };

        match health.check(request).await {
            Ok(response) => {
                let status = response.into_inner().status;
                if status != ServingStatus::Serving as i32 {
                    tracing::warn!(service = %service, status, "Upstream reports service not serving");
                }
                Ok(())
            }
            Err(status) if matches!(status.code(), Code::Unimplemented | Code::NotFound) => {
                tracing::warn!(
                    service = %service,
                    code = ?status.code(),
                    "Upstream health check unavailable for service"
                );
                Ok(())
            }
            Err(status) => Err(ConnectionError::Connect {
                address: self.target.clone(),
                reason: status.message().to_string(),
            }),
        }
    }

    /// Forward `GetUser`. Retried on UNAVAILABLE.
    pub async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<GetUserResponse, Status> {
        self.invoke(UpstreamMethod::GetUser, request, |mut client, request| async move {
            client.get_user(request).await
        })
        .await
    }

    /// Forward `CreateUser`. Never retried.
    pub async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<CreateUserResponse, Status> {
        self.invoke(UpstreamMethod::CreateUser, request, |mut client, request| async move {
            client.create_user(request).await
        })
        .await
    }

    async fn invoke<Req, Resp, F, Fut>(
        &self,
        method: UpstreamMethod,
        request: Request<Req>,
        call: F,
    ) -> Result<Resp, Status>
    where
        Req: Clone,
        F: Fn(UserServiceClient<Channel>, Request<Req>) -> Fut,
        Fut: Future<Output = Result<Response<Resp>, Status>>,
    {
        let (metadata, _, message) = request.into_parts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request =
                Request::from_parts(metadata.clone(), tonic::Extensions::default(), message.clone());

            let result = self
                .timing
                .observe(method.path(), call(self.client.clone(), request))
                .await;

            match result {
                Ok(response) => return Ok(response.into_inner()),
                Err(status)
                    if attempt < self.retry.max_attempts && is_retryable(method, status.code()) =>
                {
                    let delay = calculate_backoff(attempt, &self.retry);
                    tracing::debug!(
                        method = %method,
                        attempt,
                        delay = ?delay,
                        "Retrying upstream call"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(status) => return Err(status),
            }
        }
    }
}

fn build_endpoint(address: &str, config: &UpstreamConfig) -> Result<Endpoint, ConnectionError> {
    let mut endpoint = Endpoint::from_shared(address.to_string())
        .map_err(|e| ConnectionError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs));

    if config.credentials == CredentialsMode::Tls {
        let mut tls = ClientTlsConfig::new();
        if let Some(domain) = &config.tls_domain {
            tls = tls.domain_name(domain.clone());
        }
        if let Some(path) = &config.ca_cert_path {
            let pem = std::fs::read(path)
                .map_err(|e| ConnectionError::Tls(format!("{}: {}", path, e)))?;
            tls = tls.ca_certificate(Certificate::from_pem(pem));
        }
        endpoint = endpoint
            .tls_config(tls)
            .map_err(|e| ConnectionError::Tls(e.to_string()))?;
    }

    Ok(endpoint)
}
