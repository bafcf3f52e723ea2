//! The forwarding core: one inbound request in, one upstream call, one
//! relayed response out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::Request;

use crate::config::{ObservabilityConfig, UpstreamConfig};
use crate::http::error::ForwardError;
use crate::http::request::{prepare_upstream_body, InboundRequest, UpstreamTarget};
use crate::http::response::{OutboundResponse, ResponseBody};
use crate::observability::metrics;
use crate::resilience::timeouts::{build_upstream_client, UpstreamClient, UpstreamFailure};
use crate::security::headers::{relay_headers, upstream_headers};

/// Translates inbound requests into upstream calls.
///
/// Cheap to clone; the client pool and configuration are shared.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    upstream: Arc<UpstreamConfig>,
    log_bodies: bool,
}

impl Forwarder {
    /// Build a forwarder with its own upstream client.
    pub fn new(upstream: UpstreamConfig, observability: &ObservabilityConfig) -> Self {
        let client = build_upstream_client(&upstream);
        Self::with_client(client, upstream, observability)
    }

    pub fn with_client(client: UpstreamClient, upstream: UpstreamConfig, observability: &ObservabilityConfig) -> Self {
        Self {
            client,
            upstream: Arc::new(upstream),
            log_bodies: observability.log_bodies,
        }
    }

    pub fn upstream(&self) -> &UpstreamConfig {
        &self.upstream
    }

    /// Forward one request. Every failure comes back as a [`ForwardError`];
    /// upstream non-2xx responses come back as `Ok`.
    pub async fn forward(&self, inbound: InboundRequest) -> Result<OutboundResponse, ForwardError> {
        let start = Instant::now();
        let request_id = inbound.request_id().to_string();
        let method = inbound.method.clone();

        let result = self.forward_inner(&request_id, inbound).await;

        match &result {
            Ok(response) => {
                metrics::record_request(method.as_str(), response.status.as_u16(), start);
            }
            Err(err) => {
                if let ForwardError::Upstream(failure) = err {
                    metrics::record_upstream_error(failure.kind());
                }
                tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    status = err.status().as_u16(),
                    error = %err,
                    "Forwarding failed"
                );
                metrics::record_request(method.as_str(), err.status().as_u16(), start);
            }
        }

        result
    }

    async fn forward_inner(&self, request_id: &str, inbound: InboundRequest) -> Result<OutboundResponse, ForwardError> {
        let start = Instant::now();

        let target = UpstreamTarget::resolve(
            &self.upstream.base_url,
            &self.upstream.route_prefix,
            inbound.uri.path(),
            inbound.query(),
        )?;
        let body = prepare_upstream_body(&inbound.method, &inbound.body)?;
        let headers = upstream_headers(&self.upstream.credential, &inbound.headers)?;

        tracing::info!(
            request_id = %request_id,
            method = %inbound.method,
            upstream_url = %target,
            "Proxying request"
        );
        if self.log_bodies {
            if let Some(body) = &body {
                tracing::debug!(request_id = %request_id, body = %String::from_utf8_lossy(body), "Upstream request body");
            }
        }

        let mut request = Request::builder()
            .method(inbound.method.clone())
            .uri(target.into_uri())
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .map_err(|e| ForwardError::BuildRequest(e.to_string()))?;
        *request.headers_mut() = headers;

        let deadline = Duration::from_secs(self.upstream.timeout_secs);
        let exchange = async {
            let response = self.client.request(request).await?;
            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), usize::MAX).await?;
            Ok::<_, UpstreamFailure>((parts, bytes))
        };
        let (parts, bytes) = tokio::time::timeout(deadline, exchange)
            .await
            .map_err(|_| UpstreamFailure::deadline_exceeded(deadline))??;
        let status = parts.status;
        let headers = relay_headers(&parts.headers);

        tracing::info!(
            request_id = %request_id,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream responded"
        );
        if self.log_bodies {
            tracing::debug!(request_id = %request_id, body = %String::from_utf8_lossy(&bytes), "Upstream response body");
        }

        Ok(OutboundResponse {
            status,
            headers,
            body: ResponseBody::classify(bytes),
        })
    }
}
