//! Upstream timeout and transport failure handling.
//!
//! # Responsibilities
//! - Build the upstream client (HTTP or HTTPS) with a connect deadline
//! - Classify transport failures (timeout, connect, body, other)
//!
//! The total-call deadline wraps send plus body read in the forwarder.
//!
//! # Design Decisions
//! - Every upstream call has a deadline; a hung upstream never hangs a request
//! - Timeout errors are distinct from other errors (own summary and metric label)
//! - No retries: upstream endpoints are not assumed idempotent

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::time::Duration;

use axum::body::Body;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::UpstreamConfig;

/// Pooled upstream client. Sends the request URI as given, without
/// re-serializing the path or query.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Coarse class of an upstream transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connect,
    Body,
    Other,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::Body => "body",
            FailureKind::Other => "other",
        }
    }
}

/// A failure reaching or reading from upstream.
#[derive(Debug, Clone)]
pub struct UpstreamFailure {
    kind: FailureKind,
    message: String,
}

impl UpstreamFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout
    }

    /// The upstream did not answer (headers and body) within `deadline`.
    pub fn deadline_exceeded(deadline: Duration) -> Self {
        Self::new(
            FailureKind::Timeout,
            format!("upstream did not respond within {}s", deadline.as_secs()),
        )
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl StdError for UpstreamFailure {}

impl From<hyper_util::client::legacy::Error> for UpstreamFailure {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        let kind = if timed_out(&err) {
            FailureKind::Timeout
        } else if err.is_connect() {
            FailureKind::Connect
        } else {
            FailureKind::Other
        };
        Self::new(kind, error_chain(&err))
    }
}

impl From<axum::Error> for UpstreamFailure {
    fn from(err: axum::Error) -> Self {
        Self::new(FailureKind::Body, error_chain(&err))
    }
}

/// Connect timeouts surface as an `io::Error` somewhere in the chain.
fn timed_out(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.downcast_ref::<io::Error>().is_some_and(|io| io.kind() == io::ErrorKind::TimedOut) {
            return true;
        }
        current = e.source();
    }
    false
}

/// The useful cause (DNS, refused, TLS) sits deep in the source chain.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Build the shared upstream client.
pub fn build_upstream_client(config: &UpstreamConfig) -> UpstreamClient {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

    let https = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http);

    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(90))
        .build(https)
}
