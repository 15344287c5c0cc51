//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (interval and timeout > 0)
//! - Validate the listener address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Malformed backend URLs are not errors here; the pool skips them
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>

use axum::http::Uri;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::BalancerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The listener address is not a socket address.
    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    /// The metrics address is not a socket address.
    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    /// Health check interval must be positive.
    #[error("health_check.interval_secs must be greater than zero")]
    ZeroInterval,

    /// Probe timeout must be positive.
    #[error("health_check.timeout_secs must be greater than zero")]
    ZeroTimeout,

    /// Health path must be an absolute, URI-safe path.
    #[error("health_check.path must be an absolute URI path, got {0:?}")]
    HealthPath(String),

    /// Nothing to balance across.
    #[error("no backends configured")]
    NoBackends,
}

/// Check a parsed configuration, collecting every error.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    let path = &config.health_check.path;
    if !path.starts_with('/') || path.parse::<Uri>().is_err() {
        errors.push(ValidationError::HealthPath(config.health_check.path.clone()));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
