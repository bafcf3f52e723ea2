//! Configuration schema definitions.
//!
//! All types derive `Deserialize` with `#[serde(default)]` so a TOML file
//! only has to name what it changes. The credential and base URL have no
//! usable default; validation rejects a config that leaves them empty.

use serde::Deserialize;

use crate::config::credential::Credential;

/// Root configuration for the forwarder.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ForwarderConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API target and credential.
    pub upstream: UpstreamConfig,

    /// Server-side timeouts.
    pub timeouts: TimeoutConfig,

    /// Which trust model this instance serves.
    pub trust_mode: TrustMode,

    /// Token disclosure gate (only used in `disclose` mode).
    pub disclosure: DisclosureConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream REST API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL including the API version prefix
    /// (e.g., "https://api.example.com/v5"). Required.
    pub base_url: String,

    /// Inbound path prefix stripped before forwarding.
    pub route_prefix: String,

    /// Bearer token attached to every upstream call. Required.
    pub credential: Credential,

    /// Total upstream call timeout (connect, send, read body) in seconds.
    pub timeout_secs: u64,

    /// Upstream connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            route_prefix: "/proxy".to_string(),
            credential: Credential::default(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

/// Server-side timeout configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backstop for the whole inbound request in seconds. Must exceed the
    /// upstream timeout so the forwarder's own 500 wins the race.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 35 }
    }
}

/// Trust model served by one running instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrustMode {
    /// Inject the credential server-side; the client never sees it.
    #[default]
    Forward,
    /// Hand the credential to gated clients for direct upstream calls.
    Disclose,
}

impl std::str::FromStr for TrustMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(TrustMode::Forward),
            "disclose" => Ok(TrustMode::Disclose),
            other => Err(format!("unknown trust mode '{}'", other)),
        }
    }
}

/// Access gate for the token disclosure endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DisclosureConfig {
    /// Key callers must present as `Authorization: Bearer <key>`.
    pub access_key: Credential,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Log request and response bodies at debug level. Development only.
    pub log_bodies: bool,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            log_bodies: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
