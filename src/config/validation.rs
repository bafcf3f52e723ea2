//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required settings present (credential, upstream base URL)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Trust model prerequisites (disclosure needs an access key)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ForwarderConfig → Result<(), Vec<ValidationError>>
//! - Runs before the listener is bound

use std::net::SocketAddr;

use axum::http::Uri;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ForwarderConfig, TrustMode};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream credential is missing (set API_TOKEN)")]
    MissingCredential,

    #[error("{0} contains characters not allowed in an HTTP header")]
    InvalidCredential(&'static str),

    #[error("upstream base URL is missing (set BASE_URL)")]
    MissingBaseUrl,

    #[error("upstream base URL '{0}' is invalid: {1}")]
    InvalidBaseUrl(String, String),

    #[error("route prefix '{0}' must start with '/' and not end with '/'")]
    InvalidRoutePrefix(String),

    #[error("bind address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("metrics address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("request timeout ({request}s) must exceed upstream timeout ({upstream}s)")]
    RequestTimeoutTooShort { request: u64, upstream: u64 },

    #[error("disclose trust mode requires disclosure.access_key (set FORWARDER_DISCLOSURE_KEY)")]
    MissingDisclosureKey,
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ForwarderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let upstream = &config.upstream;

    if upstream.credential.is_empty() {
        errors.push(ValidationError::MissingCredential);
    } else if upstream.credential.bearer_header().is_err() {
        errors.push(ValidationError::InvalidCredential("upstream.credential"));
    }

    if upstream.base_url.trim().is_empty() {
        errors.push(ValidationError::MissingBaseUrl);
    } else if let Err(reason) = check_base_url(&upstream.base_url) {
        errors.push(ValidationError::InvalidBaseUrl(upstream.base_url.clone(), reason));
    }

    let prefix = &upstream.route_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') || prefix.contains(&['?', '#', '{', '}'][..]) {
        errors.push(ValidationError::InvalidRoutePrefix(prefix.clone()));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.timeout_secs"));
    }
    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.connect_timeout_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }
    if config.timeouts.request_secs <= upstream.timeout_secs {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request: config.timeouts.request_secs,
            upstream: upstream.timeout_secs,
        });
    }

    let access_key = &config.disclosure.access_key;
    if config.trust_mode == TrustMode::Disclose && access_key.is_empty() {
        errors.push(ValidationError::MissingDisclosureKey);
    } else if !access_key.is_empty() && access_key.bearer_header().is_err() {
        errors.push(ValidationError::InvalidCredential("disclosure.access_key"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    raw.parse::<Uri>().map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    Ok(())
}
