//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router for the configured trust mode
//! - Wire up middleware (request ID, tracing, body limit, timeout)
//! - Body limit is enforced by the body extractor, so oversized bodies get
//!   the same `{error, details}` shape as every other failure
//! - Hand each proxied request to the [`Forwarder`]
//! - Serve until the shutdown signal fires

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ForwarderConfig, TrustMode};
use crate::http::disclosure::disclose_token;
use crate::http::error::ForwardError;
use crate::http::forwarder::Forwarder;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, InboundRequest};
use crate::lifecycle::Shutdown;
use crate::security::access_control::{disclosure_gate, GateState};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
}

/// HTTP server for the forwarder.
pub struct HttpServer {
    router: Router,
    config: ForwarderConfig,
}

impl HttpServer {
    /// Create a new HTTP server with its own upstream client.
    pub fn new(config: ForwarderConfig) -> Self {
        let forwarder = Forwarder::new(config.upstream.clone(), &config.observability);
        Self::with_forwarder(config, forwarder)
    }

    /// Create a server around an existing forwarder.
    pub fn with_forwarder(config: ForwarderConfig, forwarder: Forwarder) -> Self {
        let state = AppState { forwarder };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ForwarderConfig, state: AppState) -> Router {
        let mut router = Router::new().route("/healthz", get(health_handler));

        router = match config.trust_mode {
            TrustMode::Forward => {
                let prefix = config.upstream.route_prefix.as_str();
                router
                    .route(prefix, any(proxy_handler))
                    .route(&format!("{}/", prefix), any(proxy_handler))
                    .route(&format!("{}/{{*rest}}", prefix), any(proxy_handler))
            }
            TrustMode::Disclose => {
                let gate = GateState {
                    access_key: Arc::new(config.disclosure.access_key.clone()),
                };
                router.route(
                    "/token",
                    get(disclose_token).route_layer(middleware::from_fn_with_state(gate, disclosure_gate)),
                )
            }
        };

        router
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            trust_mode = ?self.config.trust_mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.triggered().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    /// The fully layered router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Forward one request under the route prefix.
async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return ForwardError::PayloadTooLarge(rejection.body_text()).into_response();
        }
        Err(rejection) => return ForwardError::ReadBody(rejection.body_text()).into_response(),
    };

    let inbound = InboundRequest::new(method, uri, headers, body);
    match state.forwarder.forward(inbound).await {
        Ok(response) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
