//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URIs and value ranges
//! - Detect conflicting listeners and inconsistent deadlines
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{CredentialsMode, GatewayConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("http and rpc listeners both bind {0}")]
    ListenerConflict(String),

    #[error("{field}: invalid upstream URI '{value}'")]
    InvalidUpstream { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("shutdown.overall_timeout_secs ({overall}) is shorter than shutdown.drain_timeout_secs ({drain})")]
    DeadlineOrder { drain: u64, overall: u64 },

    #[error("http.api_prefix '{0}' must start with '/' and must not end with '/'")]
    InvalidPrefix(String),

    #[error("upstream.tls_domain is required when credentials = \"tls\"")]
    MissingTlsDomain,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let http_addr = check_addr("http.bind_address", &config.http.bind_address, &mut errors);
    let rpc_addr = check_addr("rpc.bind_address", &config.rpc.bind_address, &mut errors);
    if let (Some(http), Some(rpc)) = (http_addr, rpc_addr) {
        if http == rpc && http.port() != 0 {
            errors.push(ValidationError::ListenerConflict(http.to_string()));
        }
    }

    check_upstream_uri("upstream.address", &config.upstream.address, &mut errors);
    for endpoint in &config.upstream.endpoints {
        check_upstream_uri("upstream.endpoints", endpoint, &mut errors);
    }

    if config.upstream.credentials == CredentialsMode::Tls
        && config.upstream.tls_domain.as_deref().map_or(true, str::is_empty)
    {
        errors.push(ValidationError::MissingTlsDomain);
    }

    let positive = [
        ("http.request_timeout_secs", config.http.request_timeout_secs),
        ("http.max_body_bytes", config.http.max_body_bytes as u64),
        ("upstream.connect_timeout_secs", config.upstream.connect_timeout_secs),
        ("upstream.request_timeout_secs", config.upstream.request_timeout_secs),
        ("upstream.retry.max_attempts", config.upstream.retry.max_attempts as u64),
        ("shutdown.drain_timeout_secs", config.shutdown.drain_timeout_secs),
        ("shutdown.overall_timeout_secs", config.shutdown.overall_timeout_secs),
        ("diagnostics.capacity", config.diagnostics.capacity as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if config.shutdown.overall_timeout_secs < config.shutdown.drain_timeout_secs {
        errors.push(ValidationError::DeadlineOrder {
            drain: config.shutdown.drain_timeout_secs,
            overall: config.shutdown.overall_timeout_secs,
        });
    }

    let prefix = &config.http.api_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<SocketAddr> {
    match value.parse::<SocketAddr>() {
        Ok(addr) => Some(addr),
        Err(_) => {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

fn check_upstream_uri(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    let valid = match value.parse::<axum::http::Uri>() {
        Ok(uri) => {
            matches!(uri.scheme_str(), Some("http") | Some("https")) && uri.host().is_some()
        }
        Err(_) => false,
    };
    if !valid {
        errors.push(ValidationError::InvalidUpstream {
            field,
            value: value.to_string(),
        });
    }
}
