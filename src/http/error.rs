//! Per-request failures and their client-facing shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::resilience::timeouts::UpstreamFailure;

/// Everything that can stop a request from being relayed.
///
/// Upstream non-2xx responses are not errors; they are relayed as-is.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Non-GET/HEAD request whose body is not valid JSON.
    #[error("Invalid JSON body: {0}")]
    MalformedBody(String),

    /// The inbound body could not be read.
    #[error("Failed to read request body: {0}")]
    ReadBody(String),

    /// The inbound body exceeds `security.max_body_size`.
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    /// The derived upstream URL is not well-formed or leaves the base path.
    #[error("Invalid upstream target: {0}")]
    InvalidTarget(String),

    /// The upstream request could not be built.
    #[error("Failed to build upstream request: {0}")]
    BuildRequest(String),

    /// DNS, connect, TLS, timeout or body-read failure talking to upstream.
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] UpstreamFailure),
}

/// JSON body sent to the client on failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub details: String,
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::MalformedBody(_) | ForwardError::ReadBody(_) | ForwardError::InvalidTarget(_) => {
                StatusCode::BAD_REQUEST
            }
            ForwardError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ForwardError::BuildRequest(_) | ForwardError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            ForwardError::MalformedBody(_) => "Invalid JSON body",
            ForwardError::ReadBody(_) => "Failed to read request body",
            ForwardError::PayloadTooLarge(_) => "Request body too large",
            ForwardError::InvalidTarget(_) => "Invalid upstream path",
            ForwardError::BuildRequest(_) => "Server error",
            ForwardError::Upstream(failure) if failure.is_timeout() => "Upstream request timed out",
            ForwardError::Upstream(_) => "Server error",
        }
    }

    fn details(&self) -> String {
        match self {
            ForwardError::MalformedBody(d)
            | ForwardError::ReadBody(d)
            | ForwardError::PayloadTooLarge(d)
            | ForwardError::InvalidTarget(d)
            | ForwardError::BuildRequest(d) => d.clone(),
            ForwardError::Upstream(failure) => failure.to_string(),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.summary(),
            details: self.details(),
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::timeouts::FailureKind;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(ForwardError::MalformedBody("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ForwardError::ReadBody("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ForwardError::InvalidTarget("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ForwardError::PayloadTooLarge("x".into()).status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_upstream_failures_map_to_500() {
        let err = ForwardError::from(UpstreamFailure::new(FailureKind::Connect, "connection refused"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.to_body();
        assert_eq!(body.error, "Server error");
        assert_eq!(body.details, "connect: connection refused");
    }

    #[test]
    fn test_timeout_summary() {
        let err = ForwardError::from(UpstreamFailure::new(FailureKind::Timeout, "deadline elapsed"));
        assert_eq!(err.to_body().error, "Upstream request timed out");
    }

    #[test]
    fn test_error_body_shape() {
        let value = serde_json::to_value(ForwardError::MalformedBody("expected value".into()).to_body()).unwrap();
        assert_eq!(value, serde_json::json!({"error": "Invalid JSON body", "details": "expected value"}));
    }
}
