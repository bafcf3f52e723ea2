//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) and propagate it
//! - Capture the inbound request as an [`InboundRequest`]
//! - Derive the [`UpstreamTarget`] from the raw path and query
//! - Decide and validate the body sent upstream
//!
//! # Design Decisions
//! - Path and query are taken from the raw URI, never percent-decoded, so
//!   the upstream query is byte-identical to what the client sent
//! - GET and HEAD never carry a body upstream
//! - Any other method with a body must carry valid JSON

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, Method, Uri};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::http::error::ForwardError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that assigns an `x-request-id` to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Read the request ID assigned by [`set_request_id_layer`].
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// One inbound call, fully buffered.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    pub fn request_id(&self) -> &str {
        request_id(&self.headers)
    }

    /// The raw query string, `None` when absent or empty.
    pub fn query(&self) -> Option<&str> {
        self.uri.query().filter(|q| !q.is_empty())
    }
}

/// Fully-qualified upstream URI for one call.
///
/// Built by concatenating raw strings and parsed once as an [`Uri`], which
/// keeps the path and query exactly as the client sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    uri: Uri,
}

impl UpstreamTarget {
    /// Strip `route_prefix` from `path` and append the remainder (and the
    /// query, when non-empty) to `base_url`.
    ///
    /// Fails when the path is outside the prefix, or when the remainder's
    /// dot segments would climb out of the base URL's path (e.g. `/../v4`).
    pub fn resolve(
        base_url: &str,
        route_prefix: &str,
        path: &str,
        query: Option<&str>,
    ) -> Result<Self, ForwardError> {
        let remainder = path
            .strip_prefix(route_prefix)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| ForwardError::InvalidTarget(format!("path '{}' is not under '{}'", path, route_prefix)))?;

        if escapes_base(remainder) {
            return Err(ForwardError::InvalidTarget(format!(
                "path '{}' escapes the upstream base path",
                remainder
            )));
        }

        let base = base_url.trim_end_matches('/');
        let mut raw = String::with_capacity(base.len() + remainder.len() + query.map_or(0, |q| q.len() + 1));
        raw.push_str(base);
        raw.push_str(remainder);
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            raw.push('?');
            raw.push_str(q);
        }

        let uri = Uri::try_from(raw).map_err(|e| ForwardError::InvalidTarget(e.to_string()))?;
        Ok(Self { uri })
    }

    pub fn as_uri(&self) -> &Uri {
        &self.uri
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn into_uri(self) -> Uri {
        self.uri
    }
}

impl std::fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// True when `..` segments (plain or percent-encoded) climb above the
/// first segment of `remainder`.
fn escapes_base(remainder: &str) -> bool {
    let mut depth: usize = 0;
    for segment in remainder.split('/').filter(|s| !s.is_empty()) {
        match segment.to_ascii_lowercase().replace("%2e", ".").as_str() {
            "." => {}
            ".." => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return true,
            },
            _ => depth += 1,
        }
    }
    false
}

/// Methods that never send a body upstream.
pub fn is_bodyless(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

/// Decide what body goes upstream.
///
/// Returns `None` for GET/HEAD and for empty bodies. Otherwise the body is
/// parsed as JSON and re-encoded; a parse failure is a client error.
pub fn prepare_upstream_body(method: &Method, body: &Bytes) -> Result<Option<Vec<u8>>, ForwardError> {
    if is_bodyless(method) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ForwardError::MalformedBody(e.to_string()))?;
    let encoded = serde_json::to_vec(&value).map_err(|e| ForwardError::MalformedBody(e.to_string()))?;
    Ok(Some(encoded))
}
