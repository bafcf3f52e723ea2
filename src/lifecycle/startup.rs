//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, before the listener binds
//! - Subsystems initialize in order: logging, metrics, client, listener
//! - Listener starts last (traffic only when ready)

use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, ForwarderConfig, ReadEnv, TrustMode};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration from `path` and `env`, then [`run`].
pub async fn launch<E: ReadEnv>(path: Option<&Path>, env: &E) -> Result<(), StartupError> {
    let config = load_config(path, env)?;
    run(config).await
}

/// Start every subsystem and serve until a termination signal arrives.
///
/// `config` must already be validated.
pub async fn run(config: ForwarderConfig) -> Result<(), StartupError> {
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        route_prefix = %config.upstream.route_prefix,
        upstream_timeout_secs = config.upstream.timeout_secs,
        trust_mode = ?config.trust_mode,
        "Configuration loaded"
    );

    if config.trust_mode == TrustMode::Disclose {
        tracing::warn!(
            "Token disclosure mode: the upstream credential is handed to gated callers \
             and must be treated as known to every client that receives it"
        );
    }
    if config.observability.log_bodies {
        tracing::warn!("Body logging is enabled; do not use in production");
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let server = HttpServer::new(config);
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
